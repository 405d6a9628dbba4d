use super::RunnableCommand;
use crate::args::OutputArgs;
use crate::artifact::{CaptureMeta, DisplayMeta};
use crate::errors::CaptureResult;
use crate::paths;
use clap::Args;
use std::path::Path;

#[derive(Args, PartialEq, Eq, Debug)]
pub struct ListCommand {
    #[command(flatten)]
    output: OutputArgs,
}

impl RunnableCommand for ListCommand {
    fn run(&self) -> CaptureResult<()> {
        for line in Self::list(&self.output.output_dir)? {
            println!("{}", line?);
        }
        Ok(())
    }
}

impl ListCommand {
    pub fn list(
        output_dir: &Path,
    ) -> CaptureResult<impl Iterator<Item = CaptureResult<String>>> {
        let files = paths::list_meta_files(output_dir)?;
        Ok(files.into_iter().enumerate().map(|(index, path)| -> CaptureResult<String> {
            let meta = CaptureMeta::load(&path)?;
            Ok(DisplayMeta { index, meta }.to_string())
        }))
    }
}
