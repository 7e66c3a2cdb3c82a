//! Parse results layered over config-key defaults with figment.

use anyhow::Result;
use figment::{Figment, providers::Serialized};
use plugopt::{ConfigKeyDecl, ConfigKeyType, OptionAction, OptionAttrs, Registrar};
use serde::Deserialize;

#[derive(Debug, Deserialize, PartialEq)]
struct Settings {
    xfail_strict: bool,
    addopts: Vec<String>,
    exitfirst: bool,
    file_or_dir: Vec<String>,
}

#[test]
fn cli_values_merge_over_key_defaults() -> Result<()> {
    let mut registrar = Registrar::new().with_prog("pytest");
    registrar.add_config_key(ConfigKeyDecl::new("xfail_strict", "").kind(ConfigKeyType::Bool))?;
    registrar.add_config_key(ConfigKeyDecl::new("addopts", "").kind(ConfigKeyType::Args))?;
    registrar.add_core_option(
        &["-x", "--exitfirst"],
        OptionAttrs::new().action(OptionAction::StoreTrue),
    )?;

    let parsed = registrar.parse(["-x", "tests/"])?;
    let settings: Settings = Figment::new()
        .merge(registrar.config_keys().clone())
        .merge(Serialized::defaults(parsed.to_json()))
        .extract()?;

    assert_eq!(
        settings,
        Settings {
            xfail_strict: false,
            addopts: Vec::new(),
            exitfirst: true,
            file_or_dir: vec!["tests/".to_owned()],
        }
    );
    Ok(())
}
