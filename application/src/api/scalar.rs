//! Conversions between domain string types and GraphQL scalars.

use std::{fmt, marker::PhantomData, str::FromStr};

use juniper::{
    InputValue, ParseScalarResult, ParseScalarValue, ScalarToken, ScalarValue,
    Value,
};

/// `#[graphql(with = ..)]` adapter of a wrapper around the `Domain` type.
///
/// The scalar is the [`Display`] form of the `Domain` value, and the input is
/// validated by its [`FromStr`] impl, so the wrapper needs only [`AsRef`] and
/// [`From`] of the `Domain` type.
///
/// [`Display`]: fmt::Display
#[derive(Debug)]
pub struct Via<Domain>(PhantomData<Domain>);

impl<Domain> Via<Domain> {
    /// Outputs the wrapped `Domain` value as a string scalar.
    pub fn to_output<T, S>(value: &T) -> Value<S>
    where
        Domain: fmt::Display,
        T: AsRef<Domain>,
        S: ScalarValue,
    {
        Value::scalar(value.as_ref().to_string())
    }

    /// Parses the `Domain` value out of a string scalar and wraps it.
    ///
    /// # Errors
    ///
    /// If the `input` is not a string, or the `Domain` value rejects it.
    pub fn from_input<T, S>(input: &InputValue<S>) -> Result<T, String>
    where
        Domain: FromStr,
        Domain::Err: fmt::Display,
        T: From<Domain>,
        S: ScalarValue,
    {
        let s = input
            .as_string_value()
            .ok_or_else(|| format!("Expected a string, found: {input}"))?;
        s.parse::<Domain>()
            .map(T::from)
            .map_err(|e| format!("Invalid value \"{s}\": {e}"))
    }

    /// Parses the [`ScalarToken`] of a string literal.
    ///
    /// # Errors
    ///
    /// If the token is not a string literal.
    pub fn parse_token<S: ScalarValue>(
        value: ScalarToken<'_>,
    ) -> ParseScalarResult<S> {
        <String as ParseScalarValue<S>>::from_str(value)
    }
}

#[cfg(test)]
mod spec {
    use juniper::{DefaultScalarValue, InputValue, Value};
    use service::read::sale::Month;

    use super::Via;

    /// Wrapper standing for a GraphQL scalar type.
    struct Wrapper(Month);

    impl From<Month> for Wrapper {
        fn from(month: Month) -> Self {
            Self(month)
        }
    }

    impl AsRef<Month> for Wrapper {
        fn as_ref(&self) -> &Month {
            &self.0
        }
    }

    fn input(value: InputValue) -> Result<Wrapper, String> {
        Via::<Month>::from_input::<Wrapper, DefaultScalarValue>(&value)
    }

    #[test]
    fn parses_domain_value() {
        let month = input(InputValue::scalar(String::from("2024-02")))
            .unwrap()
            .0;

        assert_eq!(month, Month::new(2024, 2).unwrap());
    }

    #[test]
    fn rejects_invalid_value() {
        let err = input(InputValue::scalar(String::from("2024-13")))
            .err()
            .unwrap();

        assert!(err.starts_with("Invalid value \"2024-13\""), "{err}");
    }

    #[test]
    fn rejects_non_string_input() {
        let err = input(InputValue::scalar(42)).err().unwrap();

        assert!(err.starts_with("Expected a string"), "{err}");
    }

    #[test]
    fn outputs_display_form() {
        let wrapper = Wrapper(Month::new(2024, 2).unwrap());

        assert_eq!(
            Via::<Month>::to_output::<_, DefaultScalarValue>(&wrapper),
            Value::scalar(String::from("2024-02")),
        );
    }
}
