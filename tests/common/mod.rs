use assert_cmd::cargo::cargo_bin_cmd;
use assert_cmd::Command;
use std::fs;
use std::os::unix::fs::PermissionsExt;
use std::path::{Path, PathBuf};
use std::sync::OnceLock;
use tempfile::TempDir;

const FAKE_WP: &str = r#"#!/bin/sh
case "$*" in
  *"option get home"*) key=option_home ;;
  *"option get siteurl"*) key=option_siteurl ;;
  *"option get admin_email"*) key=option_admin_email ;;
  *"core check-update"*) key=core ;;
  *"plugin update"*) key=plugins ;;
  *"theme update"*) key=themes ;;
  *) echo "Error: unexpected subcommand $*" >&2; exit 1 ;;
esac
echo "$*" >> "$SYNWP_FAKE_FIXTURES/calls.log"
if [ -f "$SYNWP_FAKE_FIXTURES/$key.fail" ]; then
  cat "$SYNWP_FAKE_FIXTURES/$key.fail" >&2
  exit 1
fi
cat "$SYNWP_FAKE_FIXTURES/$key.json"
"#;

const FAKE_SENDMAIL: &str = r#"#!/bin/sh
echo "$*" > "$SYNWP_FAKE_FIXTURES/sendmail.args"
cat > "$SYNWP_FAKE_FIXTURES/sent.eml"
"#;

const FAKE_BAD_SENDMAIL: &str = r#"#!/bin/sh
cat > /dev/null
echo "relay refused" >&2
exit 75
"#;

/// Fake `wp` and `sendmail` scripts, written once per test binary so no test
/// forks while a script is still open for writing (ETXTBSY). The directory sits
/// under Cargo's per-target scratch space because statics are never dropped.
pub fn fake_bin_dir() -> &'static Path {
    static DIR: OnceLock<TempDir> = OnceLock::new();
    DIR.get_or_init(|| {
        let dir = tempfile::Builder::new()
            .prefix("synwp-fakes")
            .tempdir_in(env!("CARGO_TARGET_TMPDIR"))
            .expect("create fake bin dir");
        let scripts = [
            ("wp", FAKE_WP),
            ("sendmail", FAKE_SENDMAIL),
            ("badmail", FAKE_BAD_SENDMAIL),
        ];
        for (name, body) in scripts {
            let path = dir.path().join(name);
            fs::write(&path, body).expect("write fake script");
            fs::set_permissions(&path, fs::Permissions::from_mode(0o755))
                .expect("chmod fake script");
        }
        dir
    })
    .path()
}

pub struct TestEnv {
    _tmp: TempDir,
    pub home: PathBuf,
    pub fixtures: PathBuf,
}

impl TestEnv {
    /// A site at https://example.com with nothing pending.
    pub fn new() -> Self {
        let tmp = TempDir::new().expect("create temp dir");
        let home = tmp.path().join("home");
        let fixtures = tmp.path().join("fixtures");
        fs::create_dir_all(&home).expect("create isolated home");
        fs::create_dir_all(&fixtures).expect("create fixtures");

        let env = Self {
            _tmp: tmp,
            home,
            fixtures,
        };
        env.fixture("option_home", "\"https://example.com\"");
        env.fixture("option_siteurl", "\"https://www.example.com\"");
        env.fixture("option_admin_email", "\"admin@example.com\"");
        env.fixture("core", "[]");
        env.fixture("plugins", "[]");
        env.fixture("themes", "[]");
        env
    }

    pub fn fixture(&self, key: &str, json: &str) {
        fs::write(self.fixtures.join(format!("{key}.json")), json).expect("write fixture");
    }

    pub fn fail(&self, key: &str, stderr: &str) {
        fs::write(self.fixtures.join(format!("{key}.fail")), stderr).expect("write failure");
    }

    pub fn cmd(&self) -> Command {
        let bins = fake_bin_dir();
        let mut cmd = cargo_bin_cmd!("synwp");
        cmd.env("HOME", &self.home)
            .env("XDG_CONFIG_HOME", self.home.join(".config"))
            .env("XDG_DATA_HOME", self.home.join(".local/share"))
            .env("SYNWP_FAKE_FIXTURES", &self.fixtures)
            .env("SYNWP_WP_BIN", bins.join("wp"))
            .env("SYNWP_SENDMAIL", bins.join("sendmail"))
            .env_remove("SYNWP_CONFIG")
            .env_remove("SYNWP_WP_PATH");
        cmd
    }

    pub fn calls(&self) -> Vec<String> {
        fs::read_to_string(self.fixtures.join("calls.log"))
            .unwrap_or_default()
            .lines()
            .map(str::to_string)
            .collect()
    }

    pub fn sent_mail(&self) -> Option<String> {
        fs::read_to_string(self.fixtures.join("sent.eml")).ok()
    }

    pub fn sendmail_args(&self) -> Option<String> {
        fs::read_to_string(self.fixtures.join("sendmail.args"))
            .ok()
            .map(|s| s.trim().to_string())
    }
}
