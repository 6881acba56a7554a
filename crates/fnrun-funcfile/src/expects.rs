use fnrun_core::{EnvList, EnvSource, FunctionDeclaration};

use crate::error::FuncfileError;

/// Parse caller `-e` flags into an env list.
///
/// `KEY=VALUE` is taken as given; a bare `KEY` takes its value from `source`
/// (empty when unset there).
pub fn parse_env_flags<S: EnvSource + ?Sized>(flags: &[String], source: &S) -> EnvList {
    let mut env = EnvList::new();
    for flag in flags {
        if env.push_assignment(flag) {
            continue;
        }
        let key = flag.trim();
        if key.is_empty() || key.contains('=') {
            tracing::warn!(flag = %flag, "Ignoring env flag without a variable name");
            continue;
        }
        env.push(key, source.var(key).unwrap_or_default());
    }
    env
}

/// Check the declaration's expected configuration against the caller's
/// variables, falling back to `source`.
///
/// Values found only in `source` are appended to the returned list. A
/// required variable found nowhere is an error naming it; a missing
/// optional one is logged and skipped.
pub fn check_expectations<S: EnvSource + ?Sized>(
    declaration: &FunctionDeclaration,
    mut env: EnvList,
    source: &S,
) -> Result<EnvList, FuncfileError> {
    for expected in &declaration.expects.config {
        let name = expected.name.as_str();

        if env.get(name).is_some_and(|v| !v.is_empty()) {
            continue;
        }

        if let Some(value) = source.var(name).filter(|v| !v.is_empty()) {
            tracing::debug!(name, "Expected config taken from environment");
            env.push(name, value);
            continue;
        }

        if expected.required {
            return Err(FuncfileError::MissingConfig {
                name: name.to_string(),
            });
        }
        tracing::info!(name, "Optional config not set");
    }

    Ok(env)
}

#[cfg(test)]
mod tests {
    use super::*;
    use fnrun_core::{ConfigExpectation, MemoryEnv};

    fn declaration(expects: &[(&str, bool)]) -> FunctionDeclaration {
        let mut decl = FunctionDeclaration::new("hello");
        decl.expects.config = expects
            .iter()
            .map(|(name, required)| ConfigExpectation {
                name: name.to_string(),
                required: *required,
            })
            .collect();
        decl
    }

    #[test]
    fn missing_required_config_names_variable() {
        let decl = declaration(&[("API_KEY", true)]);
        let err = check_expectations(&decl, EnvList::new(), &MemoryEnv::default()).unwrap_err();

        assert!(matches!(&err, FuncfileError::MissingConfig { name } if name == "API_KEY"));
        assert!(err.to_string().contains("API_KEY"));
    }

    #[test]
    fn caller_flag_satisfies_expectation() {
        let decl = declaration(&[("API_KEY", true)]);
        let env: EnvList = [("API_KEY", "from-flag")].into_iter().collect();
        let source: MemoryEnv = [("API_KEY", "from-env")].into_iter().collect();

        let env = check_expectations(&decl, env, &source).unwrap();
        assert_eq!(env.len(), 1);
        assert_eq!(env.get("API_KEY"), Some("from-flag"));
    }

    #[test]
    fn falls_back_to_process_environment() {
        let decl = declaration(&[("API_KEY", true), ("REGION", false)]);
        let source: MemoryEnv = [("API_KEY", "secret"), ("REGION", "eu-west-1")]
            .into_iter()
            .collect();

        let env = check_expectations(&decl, EnvList::new(), &source).unwrap();
        assert_eq!(env.assignments(), vec!["API_KEY=secret", "REGION=eu-west-1"]);
    }

    #[test]
    fn empty_flag_value_falls_through() {
        let decl = declaration(&[("API_KEY", true)]);
        let env: EnvList = [("API_KEY", "")].into_iter().collect();
        let source: MemoryEnv = [("API_KEY", "secret")].into_iter().collect();

        let env = check_expectations(&decl, env, &source).unwrap();
        assert_eq!(env.get("API_KEY"), Some("secret"));
    }

    #[test]
    fn optional_config_may_be_missing() {
        let decl = declaration(&[("LOG_LEVEL", false)]);
        let env = check_expectations(&decl, EnvList::new(), &MemoryEnv::default()).unwrap();
        assert!(env.is_empty());
    }

    #[test]
    fn bare_flag_reads_value_from_source() {
        let source: MemoryEnv = [("HOME_REGION", "us-east-1")].into_iter().collect();
        let flags = vec![
            "DB_URL=postgres://db?a=b".to_string(),
            "HOME_REGION".to_string(),
            "UNSET".to_string(),
        ];

        let env = parse_env_flags(&flags, &source);
        assert_eq!(
            env.assignments(),
            vec!["DB_URL=postgres://db?a=b", "HOME_REGION=us-east-1", "UNSET="]
        );
    }
}
