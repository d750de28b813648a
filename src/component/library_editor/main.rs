use super::library::{RenameOutcome, list_mp3_files, rename_in_place};
use crate::component::media_grabber::{print_report, read_image_path, read_tag_fields};
use crate::component::media_pipeline::{LoftyTagger, TagEdit, tag_local_file};
use crate::config::Config;
use crate::error::AppResult;
use crate::tools::Prompter;
use console::{Term, style};
use log::info;
use rust_i18n::t;
use std::path::{Path, PathBuf};
use std::sync::Arc;
use std::sync::atomic::AtomicBool;

pub struct LibraryEditor {
    config: Config,
    prompter: Prompter,
}

impl LibraryEditor {
    pub fn new(config: Config, shutdown_signal: Arc<AtomicBool>) -> Self {
        Self {
            config,
            prompter: Prompter::new(Term::stdout(), shutdown_signal),
        }
    }

    pub fn run(&self) -> AppResult<()> {
        println!("{}", style(t!("edit.title")).cyan().bold());

        let Some(file) = self.pick_file()? else {
            return Ok(());
        };

        let tags = self.read_tag_edit()?;
        let cover = if self.prompter.confirm(t!("edit.cover_confirm"))? {
            let path = read_image_path(&self.prompter)?;
            if path.is_none() {
                println!("{}", style(t!("edit.cover_none")).dim());
            }
            path
        } else {
            None
        };

        if tags.is_some() || cover.is_some() {
            let report = tag_local_file(&LoftyTagger, &file, tags.as_ref(), cover.as_deref());
            print_report(&report);
        }

        self.rename(&file)?;
        println!("{}", style(t!("edit.done")).green().bold());
        Ok(())
    }

    fn pick_file(&self) -> AppResult<Option<PathBuf>> {
        let save_dir = &self.config.save_dir;
        let files = list_mp3_files(save_dir)?;
        if files.is_empty() {
            println!(
                "{}",
                style(t!("edit.no_files", dir = save_dir.display())).yellow()
            );
            return Ok(None);
        }

        let names: Vec<String> = files
            .iter()
            .enumerate()
            .map(|(i, f)| {
                let name = f.file_name().unwrap_or_default().to_string_lossy();
                format!("[{}] {name}", i + 1)
            })
            .collect();

        let choice = self.prompter.select(t!("edit.pick_file"), &names)?;
        Ok(choice.and_then(|i| files.get(i).cloned()))
    }

    fn read_tag_edit(&self) -> AppResult<Option<TagEdit>> {
        if !self.prompter.confirm(t!("edit.metadata_confirm"))? {
            return Ok(None);
        }

        let replace_existing = self.prompter.confirm(t!("edit.clear_confirm"))?;
        let fields = read_tag_fields(&self.prompter, None)?;

        if !replace_existing && fields.is_empty() {
            return Ok(None);
        }
        Ok(Some(TagEdit {
            fields,
            replace_existing,
        }))
    }

    fn rename(&self, file: &Path) -> AppResult<()> {
        let current = file.file_name().unwrap_or_default().to_string_lossy();
        let input = self
            .prompter
            .text(t!("edit.rename_prompt", name = current))?;
        if input.is_empty() {
            return Ok(());
        }

        match rename_in_place(file, &input)? {
            RenameOutcome::Renamed(target) => {
                info!("Renamed to {}", target.display());
                println!(
                    "{}",
                    style(t!("edit.renamed", path = target.display())).green()
                );
            }
            RenameOutcome::Unchanged => {
                println!("{}", style(t!("edit.name_unchanged")).dim());
            }
            RenameOutcome::TargetExists(target) => {
                println!(
                    "{}",
                    style(t!("edit.target_exists", path = target.display())).yellow()
                );
            }
        }
        Ok(())
    }
}
