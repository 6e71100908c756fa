//! Load configuration from TOML files.

use std::path::Path;

use serde::de::DeserializeOwned;

/// Read data from a TOML file.
pub(crate) fn read_file<T, P>(path: P) -> anyhow::Result<T>
where
    T: DeserializeOwned,
    P: AsRef<Path>,
{
    let path = path.as_ref();
    let content = std::fs::read_to_string(path)?;
    read_str(content)
}

/// Read data from a TOML string.
pub(crate) fn read_str<T, S>(content: S) -> anyhow::Result<T>
where
    T: DeserializeOwned,
    S: AsRef<str>,
{
    Ok(::toml::from_str(content.as_ref())?)
}

#[cfg(test)]
mod tests {
    use super::super::Config;

    #[test]
    fn load_config_str() {
        const CONTENT: &str = r#"
            input_dir = "foo"
            output_dir = "bar"
            batch_size = 8
            image_quality = 65.5

            [context]
            title = "Home"
            menu = ["about", "blog"]
        "#;

        let config: Config = super::read_str(CONTENT).unwrap();

        assert_eq!(config.input_dir.to_str().unwrap(), "foo");
        assert_eq!(config.output_dir.to_str().unwrap(), "bar");
        assert_eq!(config.batch_size, 8);
        assert_eq!(config.image_quality, 65.5);
        assert_eq!(config.context.get("title").and_then(|v| v.as_str()), Some("Home"));
        assert_eq!(config.context.get("menu").and_then(|v| v.as_array()).map(Vec::len), Some(2));
    }

    #[test]
    fn load_config_empty() {
        let config: Config = super::read_str("").unwrap();

        assert_eq!(config.input_dir, super::super::default_input_dir());
        assert_eq!(config.output_dir, super::super::default_output_dir());
        assert_eq!(config.batch_size, super::super::default_batch_size());
        assert_eq!(config.image_quality, super::super::default_image_quality());
    }

    #[test]
    fn load_config_unknown_key() {
        let result: anyhow::Result<Config> = super::read_str("minify = false");

        assert!(result.is_err());
    }
}
