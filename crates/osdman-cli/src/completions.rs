//! Shell completion scripts for `osdman`.
//!
//! `clap_complete` generates the subcommand and flag completions. Each script
//! then installs a wrapper that asks the hidden `osdman complete` command for
//! the domains and verbs of `call`, so candidates follow the configuration
//! that is current when the user presses tab. Load a script with
//! `source <(osdman completion bash)`, `source <(osdman completion zsh)`, or
//! `osdman completion fish | source`.

use std::io::{self, Write};

use clap::{CommandFactory, ValueEnum};
use clap_complete::{generate, shells};

use crate::cli::Cli;

const BIN_NAME: &str = "osdman";

const BASH_HOOK: &str = r#"
_osdman_dynamic() {
    local cur="${COMP_WORDS[COMP_CWORD]}"
    local i
    for (( i = 1; i < COMP_CWORD; i++ )); do
        if [[ "${COMP_WORDS[i]}" == "call" ]]; then
            local words=("${COMP_WORDS[@]:i+1:COMP_CWORD-i-1}")
            COMPREPLY=( $(compgen -W "$(osdman complete "${words[@]}" 2>/dev/null)" -- "$cur") )
            return 0
        fi
    done
    _osdman "$@"
}
complete -F _osdman_dynamic -o bashdefault -o default osdman
"#;

const ZSH_HOOK: &str = r#"
_osdman_dynamic() {
    local idx=${words[(i)call]}
    if (( idx < CURRENT )); then
        local -a candidates
        candidates=(${(f)"$(osdman complete ${words[idx+1,CURRENT-1]} 2>/dev/null)"})
        compadd -a candidates
        return
    fi
    _osdman "$@"
}
compdef _osdman_dynamic osdman
"#;

const FISH_HOOK: &str = r#"
function __osdman_call_words
    set -l seen 0
    for token in (commandline -opc)
        if test $seen -eq 1
            echo $token
        else if test "$token" = call
            set seen 1
        end
    end
end
complete -c osdman -n '__fish_seen_subcommand_from call' -f -a '(osdman complete (__osdman_call_words) 2>/dev/null)'
"#;

/// Shells a completion script can be generated for.
#[derive(Debug, Clone, Copy, PartialEq, Eq, ValueEnum)]
pub(crate) enum CompletionShell {
    Bash,
    Zsh,
    Fish,
}

impl CompletionShell {
    const fn hook(self) -> &'static str {
        match self {
            Self::Bash => BASH_HOOK,
            Self::Zsh => ZSH_HOOK,
            Self::Fish => FISH_HOOK,
        }
    }
}

/// Writes the completion script for `shell` into `out`.
pub(crate) fn write_script<W>(shell: CompletionShell, out: &mut W) -> io::Result<()>
where
    W: Write,
{
    let mut command = Cli::command();
    match shell {
        CompletionShell::Bash => generate(shells::Bash, &mut command, BIN_NAME, &mut *out),
        CompletionShell::Zsh => generate(shells::Zsh, &mut command, BIN_NAME, &mut *out),
        CompletionShell::Fish => generate(shells::Fish, &mut command, BIN_NAME, &mut *out),
    }
    out.write_all(shell.hook().as_bytes())
}
