use anyhow::Result;
use pretty_assertions::assert_eq;

use crate::{CliTest, stderr, stdout};

const TWO_LOCALES: &str = r#"{
  "primaryLocale": "en",
  "locales": ["en", "de"]
}"#;

fn project(template: &str) -> Result<CliTest> {
    let test = CliTest::with_file(".msgkeysrc.json", TWO_LOCALES)?;
    test.write_file("src/app/frontend/foo.html", template)?;
    Ok(test)
}

#[test]
fn test_dry_run_writes_modules_but_not_bundles() -> Result<()> {
    let test = project("<h1>[[Hello|greeting]]</h1>")?;

    let output = test.extract_command().output()?;

    assert!(output.status.success(), "stderr: {}", stderr(&output));
    let out = stdout(&output);
    assert!(out.contains("Extracted 1 message(s) from 1 template(s): 0 reused, 1 new"));
    assert!(out.contains("would update"));
    assert!(out.contains("Run with --apply to write 2 bundle(s)."));

    assert!(!test.root().join("i18n/messages-en.xtb").exists());
    assert!(!test.root().join("i18n/messages-de.xtb").exists());

    let module = test.read_file(".tmp/messages_for_extraction/foo.html.js")?;
    assert_eq!(
        module,
        "/** @desc greeting */\n\
         var MSG_FOO_0 = goog.getMsg(\"Hello\");\n\
         \n\
         export default \"<h1>\" + MSG_FOO_0 + \"</h1>\";\n"
    );

    Ok(())
}

#[test]
fn test_apply_creates_bundles() -> Result<()> {
    let test = project("<h1>[[Hello|greeting]]</h1>\n<p>[[Bye]]</p>")?;

    let output = test.extract_command().arg("--apply").output()?;

    assert!(output.status.success(), "stderr: {}", stderr(&output));
    let en = test.read_file("i18n/messages-en.xtb")?;
    assert_eq!(
        en,
        "<?xml version=\"1.0\" encoding=\"UTF-8\"?>\n\
         <!DOCTYPE translationbundle>\n\
         <translationbundle lang=\"en\">\n  \
         <translation key=\"MSG_FOO_0\" desc=\"greeting\">Hello</translation>\n  \
         <translation key=\"MSG_FOO_1\" desc=\"(no description provided)\">Bye</translation>\n\
         </translationbundle>\n"
    );
    assert!(test.read_file("i18n/messages-de.xtb")?.contains("lang=\"de\""));

    Ok(())
}

#[test]
fn test_rerun_is_byte_identical() -> Result<()> {
    let test = project("[[Hello|greeting]] [[Bye]] [[Hello|greeting]]")?;

    test.extract_command().arg("--apply").output()?;
    let first_en = test.read_file("i18n/messages-en.xtb")?;
    let first_module = test.read_file(".tmp/messages_for_extraction/foo.html.js")?;

    let output = test.extract_command().arg("--apply").output()?;

    assert!(output.status.success());
    assert!(stdout(&output).contains("3 reused, 0 new"));
    assert!(stdout(&output).contains("unchanged"));
    assert_eq!(test.read_file("i18n/messages-en.xtb")?, first_en);
    assert_eq!(
        test.read_file(".tmp/messages_for_extraction/foo.html.js")?,
        first_module
    );

    Ok(())
}

#[test]
fn test_edited_template_reuses_and_prunes() -> Result<()> {
    let test = project("[[Hello|greeting]] [[Bye]] [[Later]]")?;
    test.extract_command().arg("--apply").output()?;

    test.write_file("src/app/frontend/foo.html", "[[New text]] [[Hello|greeting]]")?;
    let output = test.extract_command().arg("--apply").output()?;

    assert!(output.status.success(), "stderr: {}", stderr(&output));
    let out = stdout(&output);
    assert!(out.contains("1 reused, 1 new"));
    assert!(out.contains("MSG_FOO_2 \"Later\""));

    let module = test.read_file(".tmp/messages_for_extraction/foo.html.js")?;
    assert!(module.contains("var MSG_FOO_0 = goog.getMsg(\"Hello\");"));
    assert!(module.contains("var MSG_FOO_1 = goog.getMsg(\"New text\");"));

    let en = test.read_file("i18n/messages-en.xtb")?;
    assert!(en.contains(">New text<"));
    assert!(!en.contains(">Bye<"));
    assert!(!en.contains("MSG_FOO_2"));

    Ok(())
}

#[test]
fn test_raw_source_reference_keeps_key_alive() -> Result<()> {
    let test = project("[[Hello]] [[Only in code]]")?;
    test.extract_command().arg("--apply").output()?;

    test.write_file("src/app/frontend/foo.html", "[[Hello]]")?;
    test.write_file(
        "src/app/frontend/foo_controller.js",
        "export const label = () => MSG_FOO_1;\n",
    )?;
    let output = test.extract_command().arg("--apply").output()?;

    assert!(output.status.success());
    assert!(stdout(&output).contains("1 key(s) referenced directly"));
    let en = test.read_file("i18n/messages-en.xtb")?;
    assert!(en.contains("key=\"MSG_FOO_1\""));

    Ok(())
}

#[test]
fn test_translations_survive_reextraction() -> Result<()> {
    let test = project("[[Hello|greeting]]")?;
    test.write_file(
        "i18n/messages-en.xtb",
        r#"<translationbundle lang="en">
  <translation key="MSG_FOO_0" desc="greeting">Hello</translation>
</translationbundle>"#,
    )?;
    test.write_file(
        "i18n/messages-de.xtb",
        r#"<translationbundle lang="de">
  <translation key="MSG_FOO_0" desc="greeting">Hallo</translation>
</translationbundle>"#,
    )?;

    let output = test.extract_command().arg("--apply").output()?;

    assert!(output.status.success(), "stderr: {}", stderr(&output));
    let de = test.read_file("i18n/messages-de.xtb")?;
    assert!(de.contains(">Hallo<"));
    assert!(!de.contains(">Hello<"));

    Ok(())
}

#[test]
fn test_corrupt_primary_bundle_is_an_error() -> Result<()> {
    let test = project("[[Hello]]")?;
    test.write_file("i18n/messages-en.xtb", "<translationbundle lang=\"en\">")?;

    let output = test.extract_command().arg("--apply").output()?;

    assert_eq!(output.status.code(), Some(2));
    assert!(stderr(&output).contains("messages-en.xtb"));
    assert_eq!(
        test.read_file("i18n/messages-en.xtb")?,
        "<translationbundle lang=\"en\">"
    );

    Ok(())
}

#[test]
fn test_corrupt_secondary_bundle_fails_only_that_locale() -> Result<()> {
    let test = project("[[Hello]]")?;
    test.write_file("i18n/messages-de.xtb", "<translationbundle><oops/>")?;

    let output = test.extract_command().arg("--apply").output()?;

    assert_eq!(output.status.code(), Some(1));
    assert!(stdout(&output).contains("1 locale(s) failed"));
    assert!(test.read_file("i18n/messages-en.xtb")?.contains("MSG_FOO_0"));
    assert_eq!(
        test.read_file("i18n/messages-de.xtb")?,
        "<translationbundle><oops/>"
    );

    Ok(())
}

#[cfg(unix)]
#[test]
fn test_command_generator_failure_is_per_locale() -> Result<()> {
    let test = CliTest::with_file(
        ".msgkeysrc.json",
        r#"{
  "locales": ["en", "fr"],
  "generator": {
    "kind": "command",
    "program": "/bin/sh",
    "args": [
      "-c",
      "if [ \"$0\" = fr ]; then echo no fr support >&2; exit 3; fi; printf '<translationbundle lang=\"%s\"><translation key=\"MSG_FOO_0\" desc=\"d\">Hi</translation></translationbundle>' \"$0\" > \"$1\"",
      "{locale}",
      "{output}"
    ]
  }
}"#,
    )?;
    test.write_file("src/app/frontend/foo.html", "[[Hi|d]]")?;
    test.write_file("i18n/messages-fr.xtb", "<translationbundle lang=\"fr\"/>")?;

    let output = test.extract_command().arg("--apply").output()?;

    assert_eq!(output.status.code(), Some(1), "stderr: {}", stderr(&output));
    assert!(stdout(&output).contains("no fr support"));
    assert!(test.read_file("i18n/messages-en.xtb")?.contains("MSG_FOO_0"));
    assert_eq!(
        test.read_file("i18n/messages-fr.xtb")?,
        "<translationbundle lang=\"fr\"/>"
    );
    assert!(!test.root().join("i18n/messages-en.xtb.generated").exists());

    Ok(())
}

#[test]
fn test_source_root_and_primary_locale_flags() -> Result<()> {
    let test = CliTest::new()?;
    test.write_file("web/src/app/frontend/chrome/nav.html", "[[Home|nav link]]")?;

    let output = test
        .extract_command()
        .args(["--source-root", "web", "--primary-locale", "ja", "--apply"])
        .output()?;

    assert!(output.status.success(), "stderr: {}", stderr(&output));
    let ja = test.read_file("web/i18n/messages-ja.xtb")?;
    assert!(ja.contains("lang=\"ja\""));
    assert!(ja.contains("key=\"MSG_CHROME_NAV_0\""));
    assert!(test.root().join("web/i18n/messages-en.xtb").exists());

    Ok(())
}

#[test]
fn test_invalid_config_is_an_error() -> Result<()> {
    let test = CliTest::with_file(".msgkeysrc.json", r#"{"keyPrefix": "MSG-"}"#)?;

    let output = test.extract_command().output()?;

    assert_eq!(output.status.code(), Some(2));
    assert!(stderr(&output).contains("keyPrefix"));

    Ok(())
}
