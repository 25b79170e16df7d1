use crate::graph::CellCategory;
use crate::settings::Settings;
use crate::value::{ScalarData, SequenceShape, Value};

/// Integers above this magnitude are annotated with their hexadecimal form.
const HEX_THRESHOLD: u64 = 16;

/// Turns a value into display text. Consulted in registration order; the first
/// `Some` wins.
pub trait Resolver {
    fn resolve(&self, value: &Value) -> Option<String>;
}

impl<F> Resolver for F
where
    F: Fn(&Value) -> Option<String>,
{
    fn resolve(&self, value: &Value) -> Option<String> {
        self(value)
    }
}

#[derive(Clone, Debug, PartialEq, Eq)]
pub struct Interpretation {
    pub text: String,
    pub category: CellCategory,
    /// The value was the zero value of its kind.
    pub zero: bool,
}

impl Interpretation {
    fn new(text: impl Into<String>, category: CellCategory) -> Self {
        Self {
            text: text.into(),
            category,
            zero: false,
        }
    }

    fn zero(text: &str) -> Self {
        Self {
            text: text.to_string(),
            category: CellCategory::Blank,
            zero: true,
        }
    }
}

pub(crate) struct Interpreter<'a> {
    pub settings: &'a Settings,
    pub resolvers: &'a [Box<dyn Resolver>],
}

impl Interpreter<'_> {
    /// `summary` is the raw text the walker produced for an inlined child.
    pub fn interpret(&self, summary: &str, declared_type: &str, value: &Value) -> Interpretation {
        if let Some(replacement) = self.settings.substitution(declared_type, summary) {
            return Interpretation::new(replacement, CellCategory::Default);
        }

        if value.is_zero() {
            return Interpretation::zero(zero_text(value));
        }

        if declared_type == "string" {
            return Interpretation::new(summary, CellCategory::Default);
        }

        if let Some(text) = self
            .resolvers
            .iter()
            .find_map(|resolver| resolver.resolve(value))
        {
            return Interpretation::new(text, CellCategory::ExternalResolver);
        }

        if let Value::Scalar(scalar) = value
            && let Some(text) = &scalar.stringer
        {
            return Interpretation::new(text.as_str(), CellCategory::StringResolver);
        }

        if self.settings.show_hex_for_large_ints
            && let Some(text) = hex_text(value)
        {
            return Interpretation::new(text, CellCategory::Default);
        }

        if self.settings.show_type_for_numbers && value.kind().is_numeric() {
            return Interpretation::new(
                format!("{summary} ({declared_type})"),
                CellCategory::Default,
            );
        }

        Interpretation::new(summary, CellCategory::Default)
    }
}

fn zero_text(value: &Value) -> &'static str {
    match value {
        Value::Scalar(scalar) => match scalar.data {
            ScalarData::Bool(_) => "false",
            ScalarData::Int(_) | ScalarData::Uint(_) => "0",
            ScalarData::Float(_) => "0.0",
            ScalarData::Str(_) => "\"\"",
        },
        Value::Sequence {
            shape: SequenceShape::Slice,
            ..
        } => "[]",
        _ => "nil",
    }
}

fn hex_text(value: &Value) -> Option<String> {
    let Value::Scalar(scalar) = value else {
        return None;
    };

    match scalar.data {
        ScalarData::Uint(number) if number > HEX_THRESHOLD => {
            Some(format!("{number} (0x{number:x})"))
        }
        ScalarData::Int(number) if number.unsigned_abs() > HEX_THRESHOLD => {
            let sign = if number < 0 { "-" } else { "" };
            Some(format!("{number} ({sign}0x{:x})", number.unsigned_abs()))
        }
        _ => None,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn interpret(
        settings: &Settings,
        resolvers: &[Box<dyn Resolver>],
        summary: &str,
        declared: &str,
        value: &Value,
    ) -> Interpretation {
        Interpreter { settings, resolvers }.interpret(summary, declared, value)
    }

    #[test]
    fn zero_values_are_canonical_and_blank() {
        let settings = Settings::default();
        for (value, expected) in [
            (Value::typed_int("demo.Age", 0), "0"),
            (Value::uint(0), "0"),
            (Value::float(0.0), "0.0"),
            (Value::string(""), "\"\""),
            (Value::bool(false), "false"),
            (Value::nil_pointer("*demo.Node"), "nil"),
            (Value::slice("[]int", []), "[]"),
        ] {
            let interpreted = interpret(&settings, &[], "ignored", value.type_name(), &value);
            assert_eq!(interpreted.text, expected);
            assert_eq!(interpreted.category, CellCategory::Blank);
            assert!(interpreted.zero);
        }
    }

    #[test]
    fn substitution_wins_over_everything() {
        let settings = Settings::from_json_str(r#"{ "substitute": { "int": { "7": "SEVEN" } } }"#)
            .expect("settings parse");
        let interpreted = interpret(&settings, &[], "7", "int", &Value::int(7));
        assert_eq!(interpreted.text, "SEVEN");
        assert!(!interpreted.zero);
    }

    #[test]
    fn resolvers_run_in_order_before_stringers() {
        let settings = Settings::default();
        let resolvers: Vec<Box<dyn Resolver>> = vec![
            Box::new(|value: &Value| {
                (value.type_name() == "demo.Color").then(|| "red".to_string())
            }),
            Box::new(|_: &Value| Some("fallback".to_string())),
        ];
        let color = Value::typed_int("demo.Color", 1).with_stringer("Color(1)");

        let first = interpret(&settings, &resolvers, "1", "demo.Color", &color);
        assert_eq!(
            (first.text.as_str(), first.category),
            ("red", CellCategory::ExternalResolver)
        );

        let stringer = interpret(&settings, &[], "1", "demo.Color", &color);
        assert_eq!(
            (stringer.text.as_str(), stringer.category),
            ("Color(1)", CellCategory::StringResolver)
        );
    }

    #[test]
    fn numbers_get_hex_or_type_suffix() {
        let settings = Settings::default();
        let byte = Value::typed_uint("uint8", 255);
        assert_eq!(interpret(&settings, &[], "255", "uint8", &byte).text, "255 (0xff)");
        assert_eq!(interpret(&settings, &[], "-20", "int", &Value::int(-20)).text, "-20 (-0x14)");
        assert_eq!(interpret(&settings, &[], "7", "int", &Value::int(7)).text, "7 (int)");
        assert_eq!(interpret(&settings, &[], "true", "bool", &Value::bool(true)).text, "true");
        let name = Value::string("ada");
        assert_eq!(interpret(&settings, &[], "\"ada\"", "string", &name).text, "\"ada\"");

        let plain = Settings {
            show_hex_for_large_ints: false,
            show_type_for_numbers: false,
            ..Settings::default()
        };
        assert_eq!(interpret(&plain, &[], "255", "uint8", &byte).text, "255");
    }
}
