//! # Instrument
//!
//! Generates the startup file loaded by the captured shell. The file
//! replaces the user's own startup files and
//!
//! - exports the log and marker paths,
//! - appends `<UTC timestamp> <command>` to the log before every command,
//! - defines the `shellcap save` / `shellcap cancel` control command,
//! - prefixes the prompt so the user knows the session is being captured.
//!
//! How the hook is installed and how the shell is told to load the file
//! depends on the shell family, see [`InstrumentationStrategy`].

use crate::workspace::Workspace;
use std::borrow::Cow;
use std::path::{Path, PathBuf};
use std::process::Command;

/// Name of the in-session control command. It shadows the real binary.
pub const CONTROL_COMMAND: &str = "shellcap";
pub const LOG_ENV: &str = "SHELLCAP_LOG_FILE";
pub const MARKER_ENV: &str = "SHELLCAP_SAVE_MARKER";
pub const PROMPT_TAG: &str = "(shellcap) ";

const TIMESTAMP_CMD: &str = "date -u +%Y-%m-%dT%H:%M:%SZ";

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ShellKind {
    /// bash and other shells honouring `--rcfile` and a `DEBUG` trap.
    PosixTraced,
    /// zsh, hooked through `preexec`.
    ZshHooked,
}

impl ShellKind {
    pub fn strategy(self) -> &'static dyn InstrumentationStrategy {
        match self {
            ShellKind::PosixTraced => &PosixTraced,
            ShellKind::ZshHooked => &ZshHooked,
        }
    }
}

pub trait InstrumentationStrategy {
    fn kind(&self) -> ShellKind;

    /// Body of the startup file for this shell family.
    fn script(&self, log_path: &Path, marker_path: &Path) -> String;

    /// Where the startup file must be written inside the workspace.
    fn rc_path(&self, workspace: &Workspace) -> PathBuf;

    /// Point an interactive shell command at the generated startup file.
    fn configure(&self, command: &mut Command, workspace: &Workspace);
}

pub struct PosixTraced;
pub struct ZshHooked;

impl InstrumentationStrategy for PosixTraced {
    fn kind(&self) -> ShellKind {
        ShellKind::PosixTraced
    }

    fn script(&self, log_path: &Path, marker_path: &Path) -> String {
        let mut script = preamble(log_path, marker_path);
        script.push_str(&control_command("type -P"));
        script.push_str(&format!(
            r#"
__shellcap_prompt() {{
    __shellcap_ready=1
}}

# Only the first DEBUG trap after a prompt logs, and it logs the whole line
# from history so pipelines, lists and loops stay one entry.
__shellcap_preexec() {{
    [ -n "$__shellcap_ready" ] || return
    [ "$BASH_COMMAND" = "__shellcap_prompt" ] && return
    __shellcap_ready=
    local line
    line=$(HISTTIMEFORMAT= builtin history 1)
    [[ $line =~ ^[[:space:]]*[0-9]+[*]?[[:space:]]+(.*)$ ]] && line=${{BASH_REMATCH[1]}}
    printf '%s %s\n' "$({TIMESTAMP_CMD})" "$line" >> "${LOG_ENV}"
}}

unset HISTFILE
HISTCONTROL=
HISTIGNORE=
PROMPT_COMMAND=__shellcap_prompt
PS1="{PROMPT_TAG}${{PS1}}"

# Must stay last: everything after this line would be logged.
trap '__shellcap_preexec' DEBUG
"#
        ));
        script
    }

    fn rc_path(&self, workspace: &Workspace) -> PathBuf {
        workspace.posix_rc_path()
    }

    fn configure(&self, command: &mut Command, workspace: &Workspace) {
        command.arg("--rcfile").arg(self.rc_path(workspace)).arg("-i");
    }
}

impl InstrumentationStrategy for ZshHooked {
    fn kind(&self) -> ShellKind {
        ShellKind::ZshHooked
    }

    fn script(&self, log_path: &Path, marker_path: &Path) -> String {
        let mut script = preamble(log_path, marker_path);
        script.push_str(&control_command("whence -p"));
        script.push_str(&format!(
            r#"
__shellcap_preexec() {{
    printf '%s %s\n' "$({TIMESTAMP_CMD})" "$1" >> "${LOG_ENV}"
}}

if autoload -Uz +X add-zsh-hook 2>/dev/null; then
    add-zsh-hook preexec __shellcap_preexec
else
    preexec() {{ __shellcap_preexec "$@"; }}
fi

PROMPT="{PROMPT_TAG}${{PROMPT}}"
"#
        ));
        script
    }

    fn rc_path(&self, workspace: &Workspace) -> PathBuf {
        workspace.zsh_rc_path()
    }

    fn configure(&self, command: &mut Command, workspace: &Workspace) {
        command.env("ZDOTDIR", workspace.root()).arg("-i");
    }
}

/// Startup file text for `kind`. Pure, no filesystem access.
pub fn generate_instrumentation(kind: ShellKind, log_path: &Path, marker_path: &Path) -> String {
    kind.strategy().script(log_path, marker_path)
}

fn preamble(log_path: &Path, marker_path: &Path) -> String {
    format!(
        "# Generated by shellcap. Loaded in place of the user's startup files.\n\
         export {LOG_ENV}={}\n\
         export {MARKER_ENV}={}\n",
        quote_path(log_path),
        quote_path(marker_path),
    )
}

/// `lookup` prints the path of an external command, skipping functions.
fn control_command(lookup: &str) -> String {
    format!(
        r#"
{CONTROL_COMMAND}() {{
    case "$1" in
        save)
            printf '%s\n' '{CONTROL_COMMAND}: saving capture'
            mkdir -p "$(dirname "${MARKER_ENV}")"
            : > "${MARKER_ENV}"
            exit 0
            ;;
        cancel)
            printf '%s\n' '{CONTROL_COMMAND}: capture cancelled'
            rm -f "${MARKER_ENV}"
            exit 0
            ;;
        *)
            local real
            real=$({lookup} {CONTROL_COMMAND})
            if [ -n "$real" ]; then
                "$real" "$@"
            fi
            ;;
    esac
}}
"#
    )
}

fn quote_path(path: &Path) -> String {
    // NUL is the only input shlex rejects and cannot occur in a real path.
    let raw = path.to_string_lossy().replace('\0', "");
    shlex::try_quote(&raw)
        .map(Cow::into_owned)
        .unwrap_or(raw)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn paths() -> (PathBuf, PathBuf) {
        (
            PathBuf::from("/tmp/shellcap-abc/commands.log"),
            PathBuf::from("/tmp/shellcap-abc/.save_marker"),
        )
    }

    #[test]
    fn both_variants_export_paths_and_define_control_command() {
        let (log, marker) = paths();
        for kind in [ShellKind::PosixTraced, ShellKind::ZshHooked] {
            let script = generate_instrumentation(kind, &log, &marker);
            assert!(script.contains("export SHELLCAP_LOG_FILE=/tmp/shellcap-abc/commands.log"));
            assert!(script.contains("export SHELLCAP_SAVE_MARKER=/tmp/shellcap-abc/.save_marker"));
            assert!(script.contains("shellcap() {"));
            assert!(script.contains(": > \"$SHELLCAP_SAVE_MARKER\""));
            assert!(script.contains("rm -f \"$SHELLCAP_SAVE_MARKER\""));
            assert!(script.contains("(shellcap) "));
            assert!(!script.contains("sleep"));
        }
    }

    #[test]
    fn posix_variant_uses_debug_trap() {
        let (log, marker) = paths();
        let script = generate_instrumentation(ShellKind::PosixTraced, &log, &marker);
        assert!(script.trim_end().ends_with("trap '__shellcap_preexec' DEBUG"));
        assert!(script.contains("PROMPT_COMMAND=__shellcap_prompt"));
        assert!(script.contains("line=$(HISTTIMEFORMAT= builtin history 1)"));
        assert!(script.contains("\"$line\" >> \"$SHELLCAP_LOG_FILE\""));
        assert!(script.contains("HISTCONTROL=\n"));
        assert!(script.contains("PS1=\"(shellcap) ${PS1}\""));
        assert!(script.contains("real=$(type -P shellcap)"));
    }

    #[test]
    fn zsh_variant_registers_preexec_with_fallback() {
        let (log, marker) = paths();
        let script = generate_instrumentation(ShellKind::ZshHooked, &log, &marker);
        assert!(script.contains("if autoload -Uz +X add-zsh-hook 2>/dev/null; then"));
        assert!(script.contains("add-zsh-hook preexec __shellcap_preexec"));
        assert!(script.contains("preexec() { __shellcap_preexec \"$@\"; }"));
        assert!(script.contains("PROMPT=\"(shellcap) ${PROMPT}\""));
        assert!(script.contains("real=$(whence -p shellcap)"));
    }

    #[test]
    fn paths_with_metacharacters_are_quoted() {
        let log = PathBuf::from("/tmp/it's $HOME; rm -rf ~/commands.log");
        let marker = PathBuf::from("/tmp/m");
        let script = generate_instrumentation(ShellKind::PosixTraced, &log, &marker);

        let export = script
            .lines()
            .find(|line| line.starts_with("export SHELLCAP_LOG_FILE="))
            .unwrap();
        let value = export.trim_start_matches("export SHELLCAP_LOG_FILE=");
        let words = shlex::split(value).unwrap();
        assert_eq!(words, vec!["/tmp/it's $HOME; rm -rf ~/commands.log"]);
    }

    #[test]
    fn configure_points_shell_at_rc() {
        let tmp = tempfile::tempdir().unwrap();
        let workspace = Workspace::create_in(tmp.path()).unwrap();

        let mut bash = Command::new("bash");
        PosixTraced.configure(&mut bash, &workspace);
        let args: Vec<_> = bash.get_args().map(|a| a.to_owned()).collect();
        assert_eq!(
            args,
            vec![
                "--rcfile".into(),
                workspace.posix_rc_path().into_os_string(),
                "-i".into()
            ]
        );

        let mut zsh = Command::new("zsh");
        ZshHooked.configure(&mut zsh, &workspace);
        let zdotdir = zsh
            .get_envs()
            .find(|(key, _)| *key == "ZDOTDIR")
            .and_then(|(_, value)| value);
        assert_eq!(zdotdir, Some(workspace.root().as_os_str()));
        assert_eq!(ZshHooked.rc_path(&workspace), workspace.zsh_rc_path());
    }
}
