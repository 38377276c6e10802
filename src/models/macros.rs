/// Generates a typed id: a tuple struct around `$raw` with the full set of
/// ordering and serde derives, const `new`/`value` accessors, `Display`,
/// and `From` conversions in both directions.
///
/// ```ignore
/// define_id_type!(i32, ReadingLogId);
/// ```
#[macro_export]
macro_rules! define_id_type {
    ($raw:ty, $id:ident) => {
        #[derive(Debug, Copy, Clone, PartialEq, Eq, PartialOrd, Ord, Hash)]
        #[derive(serde::Serialize, serde::Deserialize)]
        pub struct $id(pub $raw);

        impl $id {
            pub const fn new(value: $raw) -> Self {
                $id(value)
            }

            pub const fn value(&self) -> $raw {
                self.0
            }
        }

        impl ::std::fmt::Display for $id {
            fn fmt(&self, f: &mut ::std::fmt::Formatter<'_>) -> ::std::fmt::Result {
                ::std::write!(f, "{}", self.0)
            }
        }

        impl ::std::convert::From<$raw> for $id {
            fn from(value: $raw) -> Self {
                $id(value)
            }
        }

        impl ::std::convert::From<$id> for $raw {
            fn from(id: $id) -> Self {
                id.0
            }
        }
    };
}

#[cfg(test)]
mod tests {
    define_id_type!(i32, SampleId);

    #[test]
    fn test_display_and_value() {
        let id = SampleId::new(7);
        assert_eq!(id.value(), 7);
        assert_eq!(id.to_string(), "7");
    }

    #[test]
    fn test_conversions() {
        let id: SampleId = 42.into();
        let raw: i32 = id.into();
        assert_eq!(raw, 42);
    }

    #[test]
    fn test_ordering() {
        assert!(SampleId(1) < SampleId(2));
        assert_eq!(SampleId(3), SampleId(3));
    }
}
