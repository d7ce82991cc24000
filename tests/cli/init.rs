use anyhow::{Context, Result};
use serde_json::Value;

use crate::{CliTest, stderr, stdout};

/// Validates config file structure and default values.
fn assert_config_content(content: &str) -> Result<()> {
    let parsed: Value = serde_json::from_str(content).context("Config should be valid JSON")?;

    for field in [
        "templateRoot",
        "messagesRoot",
        "bundleFileName",
        "primaryLocale",
        "locales",
        "keyPrefix",
        "outputDir",
    ] {
        assert!(parsed.get(field).is_some(), "Config should have '{}' field", field);
    }
    assert_eq!(parsed["generator"]["kind"], "native");
    assert_eq!(parsed["keyPrefix"], "MSG_");

    assert!(
        content.contains("  "),
        "Config should use 2-space indentation"
    );

    Ok(())
}

#[test]
fn test_init_creates_config() -> Result<()> {
    let test = CliTest::new()?;

    let output = test.command().arg("init").output()?;

    assert!(output.status.success());
    assert!(stdout(&output).contains("Created .msgkeysrc.json"));
    let content = test.read_file(".msgkeysrc.json")?;
    assert_config_content(&content)?;

    Ok(())
}

#[test]
fn test_init_fails_if_exists() -> Result<()> {
    let test = CliTest::with_file(".msgkeysrc.json", "{}")?;

    let output = test.command().arg("init").output()?;

    assert_eq!(output.status.code(), Some(1));
    assert!(stderr(&output).contains(".msgkeysrc.json already exists"));
    assert_eq!(test.read_file(".msgkeysrc.json")?, "{}");

    Ok(())
}

#[test]
fn test_init_config_is_immediately_usable() -> Result<()> {
    let test = CliTest::new()?;

    test.command().arg("init").output()?;
    test.write_file("src/app/frontend/home.html", "<h1>[[Welcome|page title]]</h1>")?;

    let output = test.extract_command().arg("--apply").output()?;
    assert!(
        output.status.success(),
        "extract should work with initialized config. stderr: {}",
        stderr(&output)
    );
    assert!(test.read_file("i18n/messages-en.xtb")?.contains("MSG_HOME_0"));

    Ok(())
}
