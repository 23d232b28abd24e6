//! Divides a duration and expresses the result in each time unit

use std::fmt;

use crate::inputs::InputsState;
use crate::options::OptionsState;
use crate::util::round;

const SECONDS_PER_MINUTE: f64 = 60.0;
const SECONDS_PER_HOUR: f64 = 3600.0;

/// One divided duration, expressed in hours, minutes and seconds
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Conversion {
    pub hours: f64,
    pub minutes: f64,
    pub seconds: f64,
}

impl Conversion {
    /// Computes `(hours, minutes, seconds) / divide`
    pub fn from_inputs(inputs: &InputsState) -> Self {
        let total_seconds =
            inputs.hours * SECONDS_PER_HOUR + inputs.minutes * SECONDS_PER_MINUTE + inputs.seconds;
        let seconds = total_seconds / inputs.divide;

        Conversion {
            hours: seconds / SECONDS_PER_HOUR,
            minutes: seconds / SECONDS_PER_MINUTE,
            seconds,
        }
    }

    /// Rounds and suffixes each unit according to `options`
    pub fn format_with(&self, options: &OptionsState) -> FormattedConversion {
        let unit = |value: f64, suffix: &str| {
            let rounded = round(value, options.rounding_decimals);
            if suffix.is_empty() {
                rounded.to_string()
            } else {
                format!("{} {}", rounded, suffix)
            }
        };

        FormattedConversion {
            hours: unit(self.hours, &options.hours_suffix),
            minutes: unit(self.minutes, &options.minutes_suffix),
            seconds: unit(self.seconds, &options.seconds_suffix),
        }
    }
}

/// Display-ready conversion results
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FormattedConversion {
    pub hours: String,
    pub minutes: String,
    pub seconds: String,
}

impl fmt::Display for FormattedConversion {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        writeln!(f, "{}", self.hours)?;
        writeln!(f, "{}", self.minutes)?;
        write!(f, "{}", self.seconds)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_divides_total_duration() {
        let inputs = InputsState {
            hours: 1.0,
            minutes: 30.0,
            seconds: 0.0,
            divide: 3.0,
        };
        let conversion = Conversion::from_inputs(&inputs);

        assert_eq!(conversion.seconds, 1800.0);
        assert_eq!(conversion.minutes, 30.0);
        assert_eq!(conversion.hours, 0.5);
    }

    #[test]
    fn test_default_inputs_are_zero() {
        let conversion = Conversion::from_inputs(&InputsState::default());
        assert_eq!(conversion.hours, 0.0);
        assert_eq!(conversion.seconds, 0.0);
    }

    #[test]
    fn test_format_uses_options() {
        let inputs = InputsState {
            hours: 0.0,
            minutes: 10.0,
            seconds: 0.0,
            divide: 3.0,
        };
        let formatted = Conversion::from_inputs(&inputs).format_with(&OptionsState::default());

        assert_eq!(formatted.hours, "0.0556 hrs");
        assert_eq!(formatted.minutes, "3.3333 min");
        assert_eq!(formatted.seconds, "200 sec");
        assert_eq!(formatted.to_string(), "0.0556 hrs\n3.3333 min\n200 sec");
    }

    #[test]
    fn test_format_with_custom_precision_and_empty_suffix() {
        let options = OptionsState {
            rounding_decimals: -1.0,
            seconds_suffix: String::new(),
            ..OptionsState::default()
        };
        let inputs = InputsState {
            hours: 0.0,
            minutes: 0.0,
            seconds: 155.0,
            divide: 1.0,
        };
        let formatted = Conversion::from_inputs(&inputs).format_with(&options);

        assert_eq!(formatted.seconds, "160");
        assert_eq!(formatted.minutes, "0 min");
    }
}
