use crate::output::{opt, print_table};
use anyhow::Context;
use dialoguer::Input;
use solum_core::planfile::{Missing, PlanDefinition};

/// Ask the user for every field the plan definition could not resolve.
pub fn fill_missing(def: &mut PlanDefinition<'_>) -> anyhow::Result<()> {
    for missing in def.missing()? {
        match missing {
            Missing::GitUrl => {
                let url = ask(missing.prompt())?;
                def.supply_git_url(url);
            }
            Missing::RunCmd => {
                let cmd = ask(missing.prompt())?;
                def.supply_run_cmd(cmd);
            }
            Missing::LanguagePack { .. } => {
                let choice = choose_language_pack(&missing)?;
                def.supply_language_pack(&choice)?;
            }
        }
    }
    Ok(())
}

fn ask(prompt: &str) -> anyhow::Result<String> {
    Input::<String>::new()
        .with_prompt(prompt)
        .interact_text()
        .with_context(|| format!("could not read an answer for: {prompt}"))
}

fn choose_language_pack(missing: &Missing) -> anyhow::Result<String> {
    let Missing::LanguagePack {
        requested,
        candidates,
    } = missing
    else {
        anyhow::bail!("not a language pack question");
    };

    if let Some(name) = requested {
        eprintln!("More than one READY languagepack is named '{name}'.");
    }
    let rows = candidates
        .iter()
        .map(|lp| {
            vec![
                opt(lp.uuid.as_deref()),
                opt(lp.name.as_deref()),
                opt(lp.description.as_deref()),
            ]
        })
        .collect();
    print_table(&["UUID", "NAME", "DESCRIPTION"], rows);

    loop {
        let answer = ask(missing.prompt())?;
        if missing.accepts(&answer) {
            return Ok(answer);
        }
        eprintln!("You must choose one of the named language packs.");
    }
}
