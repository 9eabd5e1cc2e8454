/*
 * This modules contains the `ConverterConfig` struct and its builder. The config is consumed by the
 * `LabelSequenceConverter` to convert or repair whole batches of sequences.
*/
use crate::schemes::Scheme;
use std::fmt::Display;

#[derive(Clone, Copy, Debug, Eq, PartialEq, Hash)]
/// Config struct used to simplify the inputs of the `LabelSequenceConverter`. It implements the
/// default trait.
pub struct ConverterConfig {
    /// The scheme of the input sequences. If you don't know what scheme the input uses, leave it
    /// to `None` and it will be auto-detected once per batch.
    pub(crate) source: Option<Scheme>,
    /// The scheme of the output sequences. When it is equal to the source scheme, the sequences
    /// are repaired instead of converted.
    pub(crate) target: Scheme,
    /// Can we use multiple cores to convert a batch of sequences?
    pub(crate) parallel: bool,
}

impl ConverterConfig {
    pub fn new(source: Option<Scheme>, target: Scheme, parallel: bool) -> Self {
        Self {
            source,
            target,
            parallel,
        }
    }
    pub fn source(&self) -> Option<Scheme> {
        self.source
    }
    pub fn target(&self) -> Scheme {
        self.target
    }
    pub fn parallel(&self) -> bool {
        self.parallel
    }
}

impl Default for ConverterConfig {
    fn default() -> Self {
        Self {
            source: None,
            target: Scheme::Bio,
            parallel: false,
        }
    }
}

impl From<(Option<Scheme>, Scheme, bool)> for ConverterConfig {
    fn from(value: (Option<Scheme>, Scheme, bool)) -> Self {
        Self::new(value.0, value.1, value.2)
    }
}

impl From<ConverterConfig> for (Option<Scheme>, Scheme, bool) {
    fn from(value: ConverterConfig) -> Self {
        (value.source, value.target, value.parallel)
    }
}

impl From<ConverterConfigBuilder> for ConverterConfig {
    fn from(value: ConverterConfigBuilder) -> Self {
        Self {
            source: value.source,
            target: value.target,
            parallel: value.parallel,
        }
    }
}

impl Display for ConverterConfig {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let source = match self.source {
            Some(scheme) => scheme.to_string(),
            None => String::from("auto-detected"),
        };
        write!(
            f,
            "Source scheme: {}\n Target scheme: {}\n Using parallel computations: {}",
            source, self.target, self.parallel
        )
    }
}

#[derive(Clone, Copy, Debug)]
/// This builder can be used to build and customize a `ConverterConfig` stucture.
pub struct ConverterConfigBuilder {
    source: Option<Scheme>,
    target: Scheme,
    parallel: bool,
}

impl Default for ConverterConfigBuilder {
    fn default() -> Self {
        Self::new()
    }
}

impl ConverterConfigBuilder {
    pub fn source(mut self, source: Scheme) -> Self {
        self.source = Some(source);
        self
    }
    pub fn target(mut self, target: Scheme) -> Self {
        self.target = target;
        self
    }
    pub fn parallel(mut self, parallel: bool) -> Self {
        self.parallel = parallel;
        self
    }
    pub fn new() -> Self {
        let default = ConverterConfig::default();
        Self {
            source: default.source,
            target: default.target,
            parallel: default.parallel,
        }
    }
    pub fn build(self) -> ConverterConfig {
        ConverterConfig::from(self)
    }
}

#[cfg(test)]
mod test {
    use super::*;
    use rstest::rstest;

    #[rstest]
    #[case(Scheme::Plain)]
    #[case(Scheme::Bio)]
    #[case(Scheme::Bilou)]
    fn test_builder_setters_source(#[case] scheme: Scheme) {
        let builder = ConverterConfigBuilder::default();
        let config = builder.source(scheme).build();
        assert_eq!(config.source, Some(scheme))
    }

    #[rstest]
    #[case(Scheme::Plain)]
    #[case(Scheme::Bio)]
    #[case(Scheme::Bilou)]
    fn test_builder_setters_target(#[case] scheme: Scheme) {
        let builder = ConverterConfigBuilder::default();
        let config = builder.target(scheme).build();
        assert_eq!(config.target, scheme)
    }

    #[rstest]
    #[case(true)]
    #[case(false)]
    fn test_builder_setters_parallel(#[case] parallel: bool) {
        let builder = ConverterConfigBuilder::default();
        let config = builder.parallel(parallel).build();
        assert_eq!(config.parallel, parallel)
    }

    #[test]
    fn test_builder_default_is_config_default() {
        assert_eq!(
            ConverterConfigBuilder::default().build(),
            ConverterConfig::default()
        )
    }

    #[test]
    fn test_display_auto_detected_source() {
        let config = ConverterConfig::default();
        assert!(config.to_string().contains("auto-detected"));
    }
}
