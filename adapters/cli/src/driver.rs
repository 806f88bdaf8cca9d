//! Generate or load a maze, solve it, then print the board, export the image
//! and print the statistics.

use std::{fs, io::Write};

use anyhow::{Context, Result};
use maze_solver_export::export_image_as;
use maze_solver_grid::{parse, Grid};
use maze_solver_system_analytics::{audit, StatsReport};
use maze_solver_system_dispatch::{Config as DispatchConfig, Solver};
use maze_solver_system_generation::{Config as GenerationConfig, Generator};
use tracing::{info, warn};

use crate::settings::Settings;

/// Runs one solve as described by `settings`, writing the board and the
/// statistics to `out`.
///
/// A failed consistency audit is logged, not returned: the image and the
/// statistics are still written so that unreachable cells stay visible.
pub(crate) fn run<W>(settings: &Settings, out: &mut W) -> Result<StatsReport>
where
    W: Write,
{
    let grid = build_grid(settings)?;

    let mut solver = Solver::new(DispatchConfig::new(settings.threads, settings.seed));
    let (grid, stats) = match settings.start_position() {
        Some(start) => solver.solve_from(grid, start)?,
        None => solver.solve(grid)?,
    };

    let snapshot = grid.snapshot();
    if settings.print_board {
        write!(out, "{snapshot}")?;
    }

    export_image_as(
        &grid,
        &settings.output,
        settings.scale,
        settings.format.into(),
    )
    .with_context(|| format!("failed to export image to {}", settings.output.display()))?;
    info!(path = %settings.output.display(), "wrote solved maze image");

    let report = StatsReport::from_stats(&stats);
    writeln!(out, "{report}")?;

    if let Err(error) = audit(&stats, &snapshot) {
        warn!(%error, "solve failed its consistency audit");
    }
    Ok(report)
}

fn build_grid(settings: &Settings) -> Result<Grid> {
    if let Some(path) = &settings.maze {
        let contents = fs::read_to_string(path)
            .with_context(|| format!("failed to read maze description at {}", path.display()))?;
        return parse(&contents)
            .with_context(|| format!("invalid maze description in {}", path.display()));
    }

    let mut generator = Generator::new(GenerationConfig::new(settings.seed));
    generator
        .generate(settings.height, settings.width)
        .context("failed to generate maze")
}

#[cfg(test)]
mod tests {
    use super::*;
    use maze_solver_system_dispatch::SolveError;
    use std::{
        path::PathBuf,
        process,
        sync::atomic::{AtomicUsize, Ordering},
    };

    fn scratch_path(name: &str) -> PathBuf {
        static COUNTER: AtomicUsize = AtomicUsize::new(0);
        let unique = COUNTER.fetch_add(1, Ordering::Relaxed);
        std::env::temp_dir().join(format!("maze-solver-cli-{}-{unique}-{name}", process::id()))
    }

    fn settings_for(maze: Option<PathBuf>, output: PathBuf) -> Settings {
        Settings {
            maze,
            output,
            scale: 1,
            threads: Some(1),
            ..Settings::default()
        }
    }

    #[test]
    fn unreachable_cells_still_produce_stats_and_image() {
        let maze = scratch_path("split.txt");
        fs::write(&maze, "-1,-1,-1,-1,-1\n-1,0,-1,0,-1\n-1,-1,-1,-1,-1\n").expect("maze written");
        let output = scratch_path("split.ppm");
        let settings = Settings {
            start: Some([1, 1]),
            ..settings_for(Some(maze.clone()), output.clone())
        };

        let mut printed = Vec::new();
        let report = run(&settings, &mut printed).expect("driver completes");
        let image = fs::read_to_string(&output).expect("image written");
        fs::remove_file(&maze).expect("cleanup");
        fs::remove_file(&output).expect("cleanup");

        assert_eq!(report.explorers(), 1);
        assert_eq!(report.waves(), 1);
        let printed = String::from_utf8(printed).expect("utf-8");
        assert!(printed.contains("  1"), "board is printed");
        assert!(printed.contains("Explorers spawned: 1"));
        assert!(printed.contains("Control sum: 1"));

        let mut lines = image.lines();
        assert_eq!(lines.next(), Some("P3"));
        assert_eq!(lines.next(), Some("5 3"));
        assert_eq!(lines.next(), Some("255"));
        let middle: Vec<u8> = lines
            .nth(1)
            .expect("middle row")
            .split_whitespace()
            .map(|sample| sample.parse().expect("sample"))
            .collect();
        assert_eq!(&middle[3..6], &[0, 255, 255], "start cell is claimed");
        assert_eq!(&middle[9..12], &[255, 255, 255], "unreached cell stays open");
    }

    #[test]
    fn generated_maze_is_solved_without_printing_the_board() {
        let output = scratch_path("generated.ppm");
        let settings = Settings {
            height: 11,
            width: 15,
            seed: Some(5),
            print_board: false,
            ..settings_for(None, output.clone())
        };

        let mut printed = Vec::new();
        let report = run(&settings, &mut printed).expect("driver completes");
        let image = fs::read_to_string(&output).expect("image written");
        fs::remove_file(&output).expect("cleanup");

        assert!(report.is_conserved());
        let printed = String::from_utf8(printed).expect("utf-8");
        assert!(printed.starts_with("Explorers spawned:"));
        assert!(image.starts_with("P3\n15 11\n255\n"));
    }

    #[test]
    fn missing_maze_file_is_reported_with_its_path() {
        let maze = scratch_path("absent.txt");
        let output = scratch_path("absent.ppm");
        let settings = settings_for(Some(maze.clone()), output.clone());

        let error = run(&settings, &mut Vec::new()).expect_err("file is missing");
        assert!(format!("{error:#}").contains("failed to read maze description"));
        assert!(format!("{error:#}").contains(&maze.display().to_string()));
        assert!(!output.exists());
    }

    #[test]
    fn start_override_on_a_wall_is_rejected() {
        let maze = scratch_path("wall-start.txt");
        fs::write(&maze, "-1,-1,-1\n-1,0,-1\n-1,-1,-1\n").expect("maze written");
        let output = scratch_path("wall-start.ppm");
        let settings = Settings {
            start: Some([0, 0]),
            ..settings_for(Some(maze.clone()), output.clone())
        };

        let error = run(&settings, &mut Vec::new()).expect_err("wall start");
        fs::remove_file(&maze).expect("cleanup");

        assert!(matches!(
            error.downcast_ref::<SolveError>(),
            Some(SolveError::StartNotOpen { .. })
        ));
        assert!(!output.exists());
    }
}
