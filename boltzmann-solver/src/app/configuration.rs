use crate::outer_loop::Convergence;
use color_eyre::eyre::eyre;
use config::{Config, File};
use serde::Deserialize;
use std::{env, path::PathBuf};

#[derive(Debug, Deserialize)]
pub(crate) struct Configuration {
    pub(crate) global: GlobalConfiguration,
    pub(crate) inner_loop: LoopConfiguration,
    pub(crate) outer_loop: LoopConfiguration,
    pub(crate) drag: DragConfiguration,
}

#[derive(Debug, Deserialize)]
pub(crate) struct GlobalConfiguration {
    pub(crate) number_of_workers: usize,
    pub(crate) output_directory: PathBuf,
}

#[derive(Debug, Deserialize)]
pub(crate) struct LoopConfiguration {
    maximum_iterations: usize,
    tolerance: f64,
}

#[derive(Debug, Deserialize)]
pub(crate) struct DragConfiguration {
    /// When false a coupled calculation solves both species independently
    pub(crate) enabled: bool,
}

impl Configuration {
    pub(crate) fn build() -> color_eyre::Result<Self> {
        let run_mode = env::var("RUN_MODE").unwrap_or_else(|_| "development".into());

        let s = Config::builder()
            // The default settings for the simulation which we use in the general case
            .add_source(File::with_name("../.config/default"))
            // The override settings which may be set by the user, optional
            .add_source(File::with_name(&format!("../.config/{}", run_mode)).required(false))
            .build()?;

        s.try_deserialize()
            .map_err(|e| eyre!(format!("Failed to deserialize the config file: {:?}", e)))
    }

    pub(crate) fn convergence(&self) -> Convergence {
        Convergence {
            outer_tolerance: self.outer_loop.tolerance,
            inner_tolerance: self.inner_loop.tolerance,
            maximum_outer_iterations: self.outer_loop.maximum_iterations,
            maximum_inner_iterations: self.inner_loop.maximum_iterations,
        }
    }
}

#[cfg(test)]
mod test {
    use super::Configuration;
    use config::{Config, File, FileFormat};

    #[test]
    fn sections_map_onto_the_convergence_settings() {
        let source = r#"
            [global]
            number_of_workers = 4
            output_directory = "results"

            [inner_loop]
            maximum_iterations = 20
            tolerance = 1e-8

            [outer_loop]
            maximum_iterations = 50
            tolerance = 1e-6

            [drag]
            enabled = true
        "#;
        let configuration: Configuration = Config::builder()
            .add_source(File::from_str(source, FileFormat::Toml))
            .build()
            .unwrap()
            .try_deserialize()
            .unwrap();
        let convergence = configuration.convergence();
        assert_eq!(convergence.maximum_outer_iterations, 50);
        assert_eq!(convergence.maximum_inner_iterations, 20);
        assert_eq!(convergence.outer_tolerance, 1e-6);
        assert_eq!(convergence.inner_tolerance, 1e-8);
        assert_eq!(configuration.global.number_of_workers, 4);
        assert!(configuration.drag.enabled);
    }
}
