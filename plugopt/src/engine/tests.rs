//! Unit tests for grammar compilation and value extraction.

use super::*;
use crate::{OptionAction, ValueKind};
use camino::Utf8PathBuf;
use rstest::{fixture, rstest};

#[fixture]
fn registrar() -> Registrar {
    let mut registrar = Registrar::new().with_prog("pytest");
    let general = registrar.get_or_create_group("general", "general options", None);
    general
        .add_core_option(
            &["-v", "--verbose"],
            OptionAttrs::new().action(OptionAction::Count),
        )
        .expect("verbose");
    general
        .add_core_option(
            &["--maxfail"],
            OptionAttrs::new()
                .value_kind(ValueKind::Int)
                .metavar("num")
                .default_value(0_i64),
        )
        .expect("maxfail");
    general
        .add_core_option(
            &["-o", "--override-ini"],
            OptionAttrs::new().action(OptionAction::Append).dest(OVERRIDE_INI),
        )
        .expect("override-ini");
    general
        .add_core_option(
            &["-p"],
            OptionAttrs::new().action(OptionAction::Append).dest("plugins"),
        )
        .expect("plugins");
    registrar
}

fn engine(registrar: &Registrar) -> ParseEngine {
    registrar.compile().expect("grammar compiles")
}

#[rstest]
fn absent_options_receive_defaults(registrar: Registrar) {
    let parsed = engine(&registrar).parse(Vec::<String>::new()).expect("parse");
    assert_eq!(parsed.get("verbose"), Some(&Value::Int(0)));
    assert_eq!(parsed.get("maxfail"), Some(&Value::Int(0)));
    assert_eq!(parsed.get(OVERRIDE_INI), Some(&Value::None));
    assert!(parsed.file_or_dir().is_empty());
}

#[rstest]
fn values_are_coerced(registrar: Registrar) {
    let parsed = engine(&registrar)
        .parse(["-vv", "--maxfail=3", "-p", "xdist", "-pno:cacheprovider"])
        .expect("parse");
    assert_eq!(parsed.get("verbose"), Some(&Value::Int(2)));
    assert_eq!(parsed.get("maxfail"), Some(&Value::Int(3)));
    assert_eq!(
        parsed.get("plugins"),
        Some(&Value::str_list(["xdist", "no:cacheprovider"]))
    );
}

#[rstest]
fn negative_numbers_are_values(registrar: Registrar) {
    let parsed = engine(&registrar)
        .parse(["--maxfail", "-1", "-5"])
        .expect("parse");
    assert_eq!(parsed.get("maxfail"), Some(&Value::Int(-1)));
    assert_eq!(parsed.file_or_dir(), ["-5"]);
}

#[rstest]
fn fractional_negative_positionals_reach_file_or_dir(registrar: Registrar) {
    let parsed = engine(&registrar).parse(["-.5"]).expect("parse");
    assert_eq!(parsed.file_or_dir(), ["-.5"]);
}

#[test]
fn fractional_negative_values_are_consumed() {
    let mut registrar = Registrar::new().with_prog("pytest");
    registrar
        .add_option(&["--ratio"], OptionAttrs::new().value_kind(ValueKind::Float))
        .expect("registration");
    let parsed = engine(&registrar)
        .parse(["--ratio", "-.5", "a.py"])
        .expect("parse");
    assert_eq!(parsed.get("ratio"), Some(&Value::Float(-0.5)));
    assert_eq!(parsed.file_or_dir(), ["a.py"]);
}

#[rstest]
fn values_shaped_like_flags_stay_values(registrar: Registrar) {
    let parsed = engine(&registrar)
        .parse(["-o", "-.5", "-p=x", "--", "-v"])
        .expect("parse");
    assert_eq!(parsed.get(OVERRIDE_INI), Some(&Value::str_list(["-.5"])));
    assert_eq!(parsed.get("plugins"), Some(&Value::str_list(["x"])));
    assert_eq!(parsed.get("verbose"), Some(&Value::Int(0)));
    assert_eq!(parsed.file_or_dir(), ["-v"]);
}

#[rstest]
fn override_flags_accumulate_in_order(mut registrar: Registrar) {
    registrar
        .add_option(
            &["--tmp-cache"],
            OptionAttrs::new().action(OptionAction::OverrideConfig {
                key: "cache_dir".into(),
                value: "/tmp".into(),
            }),
        )
        .expect("override flag");
    let parsed = engine(&registrar)
        .parse(["-o", "a=1", "--tmp-cache", "--override-ini=b=2", "--tmp-cache"])
        .expect("parse");
    assert_eq!(parsed.get("tmp_cache"), Some(&Value::Bool(true)));
    assert_eq!(
        parsed.get(OVERRIDE_INI),
        Some(&Value::str_list([
            "a=1",
            "cache_dir=/tmp",
            "b=2",
            "cache_dir=/tmp"
        ]))
    );
}

#[rstest]
fn absent_override_flags_stay_unset(mut registrar: Registrar) {
    registrar
        .add_option(
            &["--tmp-cache"],
            OptionAttrs::new().action(OptionAction::OverrideConfig {
                key: "cache_dir".into(),
                value: "/tmp".into(),
            }),
        )
        .expect("override flag");
    let parsed = engine(&registrar).parse(["a.py"]).expect("parse");
    assert_eq!(parsed.get("tmp_cache"), Some(&Value::None));
    assert_eq!(parsed.get(OVERRIDE_INI), Some(&Value::None));
}

#[rstest]
fn explicit_overrides_alone_keep_their_values(registrar: Registrar) {
    let parsed = engine(&registrar).parse(["-o", "a=1"]).expect("parse");
    assert_eq!(parsed.get(OVERRIDE_INI), Some(&Value::str_list(["a=1"])));
}

#[test]
fn shared_identifiers_take_first_default_and_last_occurrence() {
    let mut registrar = Registrar::new().with_prog("pytest");
    registrar
        .add_option(
            &["--color-on"],
            OptionAttrs::new().action(OptionAction::StoreTrue).dest("color"),
        )
        .expect("first");
    registrar
        .add_option(
            &["--color-off"],
            OptionAttrs::new()
                .action(OptionAction::StoreFalse)
                .dest("color")
                .default_value("auto"),
        )
        .expect("second");
    let engine = engine(&registrar);

    let parsed = engine.parse(Vec::<String>::new()).expect("parse");
    assert_eq!(parsed.get("color"), Some(&Value::Bool(false)));

    let parsed = engine.parse(["--color-off", "--color-on"]).expect("parse");
    assert_eq!(parsed.get("color"), Some(&Value::Bool(true)));

    let parsed = engine.parse(["--color-on", "--color-off"]).expect("parse");
    assert_eq!(parsed.get("color"), Some(&Value::Bool(false)));
}

#[rstest]
fn duplicate_strings_across_groups_conflict(mut registrar: Registrar) {
    registrar
        .get_or_create_group("reporting", "", None)
        .add_option(&["--maxfail"], OptionAttrs::new())
        .expect("accepted by the group itself");
    let err = registrar.compile().expect_err("conflict");
    assert_eq!(
        err,
        RegistrationError::ConflictingOption {
            name: "--maxfail".into()
        }
    );
}

#[rstest]
fn grammar_errors_carry_usage_and_hint(registrar: Registrar) {
    let registrar = registrar.with_config_source_hint("configfile: pytest.ini");
    let err = engine(&registrar)
        .parse(["--maxfail", "abc"])
        .expect_err("invalid int");
    assert!(
        err.message().starts_with("invalid value 'abc' for '--maxfail"),
        "{}",
        err.message()
    );
    let rendered = err.rendered();
    assert!(rendered.starts_with("usage: pytest [options] [file_or_dir ...]\npytest: error: "));
    assert!(rendered.ends_with(" (configfile: pytest.ini)"), "{rendered}");
}

#[test]
fn required_options_must_be_given() {
    let mut registrar = Registrar::new().with_prog("pytest");
    registrar
        .add_option(&["--basetemp"], OptionAttrs::new().required())
        .expect("registration");
    let err = engine(&registrar)
        .parse(["a.py"])
        .expect_err("missing required");
    assert!(err.message().contains("--basetemp"), "{}", err.message());
}

#[rstest]
#[case("fd", true)]
#[case("tee-sys", true)]
#[case("bogus", false)]
fn choices_restrict_values(#[case] value: &str, #[case] accepted: bool) {
    let mut registrar = Registrar::new().with_prog("pytest");
    registrar
        .add_option(
            &["--capture"],
            OptionAttrs::new().choices(["fd", "sys", "no", "tee-sys"]),
        )
        .expect("registration");
    let result = engine(&registrar).parse(["--capture", value]);
    assert_eq!(result.is_ok(), accepted);
    if let Ok(parsed) = result {
        assert_eq!(parsed.get("capture"), Some(&Value::Str(value.to_owned())));
    }
}

#[test]
fn path_values_become_paths() {
    let mut registrar = Registrar::new().with_prog("pytest");
    registrar
        .add_option(&["--rootdir"], OptionAttrs::new().value_kind(ValueKind::Path))
        .expect("registration");
    let parsed = engine(&registrar)
        .parse(["--rootdir", "src/pkg"])
        .expect("parse");
    assert_eq!(
        parsed.get("rootdir"),
        Some(&Value::Path(Utf8PathBuf::from("src/pkg")))
    );
}

#[rstest]
fn known_and_unknown_are_split(registrar: Registrar) {
    let (parsed, leftovers) = engine(&registrar)
        .parse_known_and_unknown_args(["--bogus", "a.py", "-v", "-Z"])
        .expect("parse");
    assert_eq!(leftovers, ["--bogus", "-Z"]);
    assert_eq!(parsed.file_or_dir(), ["a.py"]);
    assert_eq!(parsed.get("verbose"), Some(&Value::Int(1)));
}

#[rstest]
fn help_sections_follow_group_order(mut registrar: Registrar) {
    registrar
        .add_option(&["--secret"], OptionAttrs::new().hidden())
        .expect("hidden");
    registrar
        .add_option(&["--shown"], OptionAttrs::new())
        .expect("shown");
    let sections = engine(&registrar).help_sections();
    let labels: Vec<&str> = sections.iter().map(|(label, _)| label.as_str()).collect();
    assert_eq!(
        labels,
        ["positional arguments", "general options", "Custom options"]
    );
    let custom: Vec<String> = sections
        .last()
        .map(|(_, actions)| actions.iter().map(HelpAction::raw_invocation).collect())
        .unwrap_or_default();
    assert_eq!(custom, ["--shown SHOWN"]);
}
