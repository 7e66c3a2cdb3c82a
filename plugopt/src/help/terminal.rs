//! Terminal width detection for help wrapping.

/// Width used when the terminal size is unknown or implausibly narrow.
pub const FALLBACK_WIDTH: usize = 80;

/// Narrowest width honoured before falling back.
pub const MIN_WIDTH: usize = 40;

/// Returns the width help output should wrap to.
///
/// `COLUMNS` takes precedence when it holds a number. Otherwise the size of
/// the attached terminal is used. Anything narrower than [`MIN_WIDTH`], or no
/// width at all, yields [`FALLBACK_WIDTH`].
#[must_use]
pub fn terminal_width() -> usize {
    let columns = std::env::var("COLUMNS").ok();
    resolve_width(columns.as_deref(), || {
        crossterm::terminal::size().ok().map(|(cols, _)| cols)
    })
}

/// The `COLUMNS` rule with the tty query injected, so it can be tested
/// without a terminal.
fn resolve_width(columns: Option<&str>, tty: impl FnOnce() -> Option<u16>) -> usize {
    columns
        .and_then(|raw| raw.trim().parse::<usize>().ok())
        .or_else(|| tty().map(usize::from))
        .filter(|width| *width >= MIN_WIDTH)
        .unwrap_or(FALLBACK_WIDTH)
}

#[cfg(test)]
mod tests {
    use super::*;
    use rstest::rstest;
    use serial_test::serial;
    use test_helpers::env;

    #[rstest]
    #[case(Some("120"), 120)]
    #[case(Some(" 100 "), 100)]
    #[case(Some("39"), FALLBACK_WIDTH)]
    #[serial]
    fn width_comes_from_columns(#[case] columns: Option<&str>, #[case] expected: usize) {
        let _guard = env::scoped([("COLUMNS", columns)]);
        assert_eq!(terminal_width(), expected);
    }

    #[rstest]
    #[case(None, Some(132), 132)]
    #[case(Some("wide"), Some(100), 100)]
    #[case(None, Some(20), FALLBACK_WIDTH)]
    #[case(None, None, FALLBACK_WIDTH)]
    #[case(Some("90"), Some(200), 90)]
    fn tty_size_backs_up_columns(
        #[case] columns: Option<&str>,
        #[case] tty: Option<u16>,
        #[case] expected: usize,
    ) {
        assert_eq!(resolve_width(columns, || tty), expected);
    }

    #[test]
    #[serial]
    fn unset_columns_still_yields_a_usable_width() {
        let _guard = env::scoped([("COLUMNS", None::<&str>)]);
        assert!(terminal_width() >= MIN_WIDTH);
    }
}
