//! Registration rules seen through the public API.

use anyhow::{Context, Result};
use plugopt::{
    ConfigKeyDecl, ConfigKeyType, ConfigValue, OptionAction, OptionAttrs, OptionSpec, Registrar,
    RegistrationError, Value,
};
use rstest::rstest;

#[rstest]
#[case(&["-x", "--exit-first"], None, "exit_first")]
#[case(&["-v"], None, "v")]
#[case(&["--log-cli-level", "--lcl"], None, "log_cli_level")]
#[case(&["-k"], Some("keyword"), "keyword")]
fn identifiers_follow_names(
    #[case] names: &[&str],
    #[case] dest: Option<&str>,
    #[case] expected: &str,
) -> Result<()> {
    let mut attrs = OptionAttrs::new();
    if let Some(dest) = dest {
        attrs = attrs.dest(dest);
    }
    let spec = OptionSpec::new(names, attrs)?;
    assert_eq!(spec.identifier(), expected);
    Ok(())
}

#[test]
fn plugins_cannot_take_lowercase_short_options() -> Result<()> {
    let mut registrar = Registrar::new();
    let err = registrar
        .add_option(&["-z", "--zap"], OptionAttrs::new())
        .err()
        .context("lowercase short option should be rejected")?;
    assert!(matches!(err, RegistrationError::ReservedShortOption { .. }));
    registrar.add_option(&["-Z", "--zap"], OptionAttrs::new())?;
    registrar.add_core_option(&["-z"], OptionAttrs::new())?;
    Ok(())
}

#[test]
fn colliding_names_leave_the_group_untouched() -> Result<()> {
    let mut registrar = Registrar::new();
    let group = registrar.get_or_create_group("reporting", "reporting", None);
    group.add_option(&["--report"], OptionAttrs::new())?;
    let err = group
        .add_option(&["--other", "--report"], OptionAttrs::new())
        .err()
        .context("duplicate should fail")?;
    assert_eq!(err.to_string(), "option names --report already added");
    assert_eq!(group.options().len(), 1);
    Ok(())
}

#[test]
fn config_keys_resolve_aliases_and_defaults() -> Result<()> {
    let mut registrar = Registrar::new();
    registrar.add_config_key(
        ConfigKeyDecl::new("testpaths", "directories to search for tests")
            .kind(ConfigKeyType::Args)
            .aliases(["test_paths"]),
    )?;
    registrar.add_config_key(ConfigKeyDecl::new("minversion", "minimally required version"))?;

    let via_alias = registrar.config_key("test_paths").context("alias")?;
    assert_eq!(via_alias.kind, ConfigKeyType::Args);
    assert_eq!(via_alias.default, ConfigValue::List(Vec::new()));
    let plain = registrar.config_key("minversion").context("key")?;
    assert_eq!(plain.default, ConfigValue::Str(String::new()));
    assert_eq!(registrar.config_keys().canonical_name("test_paths"), Some("testpaths"));
    Ok(())
}

#[test]
fn config_key_aliases_cannot_shadow_keys() -> Result<()> {
    let mut registrar = Registrar::new();
    registrar.add_config_key(ConfigKeyDecl::new("markers", "markers"))?;
    let err = registrar
        .add_config_key(ConfigKeyDecl::new("marks", "markers").aliases(["markers"]))
        .err()
        .context("alias shadows key")?;
    assert_eq!(
        err,
        RegistrationError::AliasShadowsKey {
            alias: "markers".into()
        }
    );
    assert!(registrar.config_key("marks").is_none());
    Ok(())
}

#[test]
fn hook_installed_on_registrar_adjusts_defaults() -> Result<()> {
    let mut registrar = Registrar::new()
        .with_prog("pytest")
        .with_processing_hook(|spec: &mut OptionSpec| {
            if spec.identifier() == "maxfail" {
                spec.set_default(Some(Value::Int(1)));
            }
        });
    registrar
        .get_or_create_group("general", "", None)
        .add_core_option(&["--maxfail"], OptionAttrs::new().action(OptionAction::Store))?;
    let parsed = registrar.parse(Vec::<String>::new())?;
    assert_eq!(parsed.get("maxfail"), Some(&Value::Int(1)));
    Ok(())
}
