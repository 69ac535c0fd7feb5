#[cfg(test)]
mod tests {
    use super::super::*;

    #[test]
    fn test_defaults() {
        let config = Config::default();
        assert_eq!(config.data.raw_path, PathBuf::from("data/heart_raw.csv"));
        assert_eq!(config.data.cleaned_path, PathBuf::from("data/heart_cleaned.csv"));
        assert_eq!(config.data.preprocess.sentinel, "?");
        assert_eq!(config.data.preprocess.empty_column_fill, 0.0);
        assert_eq!(config.models.dir, PathBuf::from("models"));
        assert_eq!(config.models.default, ModelKind::RandomForest);
        assert_eq!(config.log_filter, "medirisk=debug,info");
    }

    #[test]
    fn test_empty_file_uses_defaults() {
        let config = Config::from_toml("").unwrap();
        assert_eq!(config.models.default, ModelKind::RandomForest);
        assert_eq!(config.data.preprocess.sentinel, "?");
    }

    #[test]
    fn test_partial_sections() {
        let config = Config::from_toml(
            r#"
            log_filter = "warn"

            [data]
            raw_path = "/srv/heart/raw.data"
            sentinel = "NA"
            empty_column_fill = -1.0

            [models]
            default = "logistic_regression"
            "#,
        )
        .unwrap();
        assert_eq!(config.log_filter, "warn");
        assert_eq!(config.data.raw_path, PathBuf::from("/srv/heart/raw.data"));
        assert_eq!(config.data.cleaned_path, PathBuf::from("data/heart_cleaned.csv"));
        assert_eq!(config.data.preprocess.sentinel, "NA");
        assert_eq!(config.data.preprocess.empty_column_fill, -1.0);
        assert_eq!(config.models.dir, PathBuf::from("models"));
        assert_eq!(config.models.default, ModelKind::LogisticRegression);
    }

    #[test]
    fn test_blank_sentinel_rejected() {
        assert!(Config::from_toml("[data]\nsentinel = \"  \"\n").is_err());
    }

    #[test]
    fn test_unknown_model_rejected() {
        assert!(Config::from_toml("[models]\ndefault = \"svm\"\n").is_err());
    }

    #[test]
    fn test_load_explicit_file() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("medirisk.toml");
        std::fs::write(&path, "[models]\ndir = \"/opt/models\"\n").unwrap();

        let config = Config::load(Some(&path)).unwrap();
        assert_eq!(config.models.dir, PathBuf::from("/opt/models"));
    }

    #[test]
    fn test_load_missing_explicit_file_fails() {
        let dir = tempfile::tempdir().unwrap();
        let err = Config::load(Some(&dir.path().join("nope.toml"))).unwrap_err();
        assert!(err.to_string().contains("Config file not found"));
    }
}
