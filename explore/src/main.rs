use biomorph::logging::Stats;
use biomorph::sampling::KMeansCentroids;
use biomorph::{
    CancellationToken, EvaluationError, Explorer, GeneApplicator, PopulationConfig, SharedResource,
};
use biomorph_host::{
    ControlSet, DesignReader, Document, GenePool, Model, ParameterEvaluator, ParameterValues, Slider,
};

use std::error::Error;
use std::fs;

use rayon::prelude::*;
use serde::{Deserialize, Serialize};

const HISTORY_PATH: &str = "explore_history.ron";

#[derive(Clone, Debug, Serialize, Deserialize)]
#[serde(default)]
struct ExploreConfig {
    population: PopulationConfig,
    generations: usize,
    sessions: usize,
    /// Designs shown to the simulated user each generation.
    shown: usize,
    /// Designs the simulated user picks among those shown.
    picks: usize,
    seed: u64,
}

impl Default for ExploreConfig {
    fn default() -> Self {
        ExploreConfig {
            population: PopulationConfig {
                mutation_rate: 0.05,
                elitism: 1,
                ..PopulationConfig::default()
            },
            generations: 15,
            sessions: 8,
            shown: 6,
            picks: 3,
            seed: 42,
        }
    }
}

/// Corner points of every floor of a tower.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
struct Mesh {
    vertices: Vec<[f64; 3]>,
    height: f64,
    max_width: f64,
}

impl Mesh {
    fn slenderness(&self) -> f64 {
        self.height / self.max_width
    }
}

/// A stack of square floors, twisted a little more at every level.
struct Tower;

impl Model for Tower {
    type Output = Mesh;

    fn solve(&mut self, values: &ParameterValues) -> Result<Vec<Mesh>, EvaluationError> {
        let (height, twist) = match values.sliders.as_slice() {
            [height, twist] => (*height, *twist),
            _ => return Err(EvaluationError::new("tower needs a height and a twist")),
        };
        let widths = values
            .gene_pools
            .first()
            .ok_or_else(|| EvaluationError::new("tower needs floor widths"))?;
        // Floors may not overhang the one below by too much.
        for (level, pair) in widths.windows(2).enumerate() {
            if pair[1] > pair[0] * 2.5 {
                return Err(EvaluationError::new(format!(
                    "floor {} overhangs: {:.2} on {:.2}",
                    level + 1,
                    pair[1],
                    pair[0]
                )));
            }
        }

        let floor_height = height / widths.len() as f64;
        let vertices = widths
            .iter()
            .enumerate()
            .flat_map(|(level, width)| {
                let angle = twist * level as f64;
                let z = floor_height * level as f64;
                let r = width / 2.0;
                [(1.0, 1.0), (-1.0, 1.0), (-1.0, -1.0), (1.0, -1.0)].map(|(sx, sy): (f64, f64)| {
                    let (x, y) = (sx * r, sy * r);
                    [
                        x * angle.cos() - y * angle.sin(),
                        x * angle.sin() + y * angle.cos(),
                        z,
                    ]
                })
            })
            .collect();
        Ok(vec![Mesh {
            vertices,
            height,
            max_width: widths.iter().copied().fold(f64::MIN, f64::max),
        }])
    }
}

fn tower_controls() -> biomorph_host::Result<ControlSet> {
    ControlSet::resolve(
        vec![
            Slider::new("height", 20.0, 120.0, 1),
            Slider::new("twist", 0.0, 0.3, 3),
        ],
        vec![GenePool::new("floor-widths", 4.0, 20.0, 6)],
    )
}

struct Session {
    explorer: Explorer<Mesh>,
    document: SharedResource<Document<Tower>>,
    applicator: GeneApplicator,
}

impl Session {
    /// Index and slenderness of the most slender evaluated design.
    fn best(&self) -> Option<(usize, f64)> {
        slenderness(&self.explorer, 0..self.explorer.population().size())
            .into_iter()
            .next()
    }
}

/// Slenderness of the evaluated designs among `indices`, most slender first.
fn slenderness(explorer: &Explorer<Mesh>, indices: impl IntoIterator<Item = usize>) -> Vec<(usize, f64)> {
    let population = explorer.population();
    let mut ranked: Vec<(usize, f64)> = indices
        .into_iter()
        .filter_map(|i| population.chromosome(i))
        .filter_map(|c| c.phenotype().first().map(|m| (c.index(), m.slenderness())))
        .collect();
    ranked.sort_by(|a, b| b.1.total_cmp(&a.1));
    ranked
}

/// Runs one exploration with a simulated user who always
/// prefers the most slender of the towers shown to them.
fn run_session(config: &ExploreConfig, seed: u64) -> biomorph_host::Result<Session> {
    let controls = tower_controls()?;
    let gene_count = controls.gene_count();
    let document = SharedResource::new(Document::new(Tower, controls));
    let applicator = GeneApplicator::new();
    let mut evaluator = ParameterEvaluator::new(document.clone(), applicator.clone());
    let cancel = CancellationToken::new();

    let mut explorer = Explorer::new(config.population.clone(), gene_count, Some(seed))?;
    explorer.evaluate_current(&mut evaluator, &cancel)?;
    let strategy = KMeansCentroids::default();

    for _ in 0..config.generations {
        let shown = explorer.representatives(&strategy, config.shown);
        let picked = slenderness(&explorer, shown);
        for (rank, (index, _)) in picked.iter().take(config.picks).enumerate() {
            explorer.set_selection_weight(*index, (config.picks - rank) as f64)?;
        }
        if let Err(e) = explorer.breed_next_generation(&mut evaluator, &cancel) {
            log::error!("session {}: {}", seed, e);
            break;
        }
    }

    Ok(Session {
        explorer,
        document,
        applicator,
    })
}

fn load_config() -> Result<ExploreConfig, Box<dyn Error>> {
    match std::env::args().nth(1) {
        Some(path) => Ok(ron::from_str(&fs::read_to_string(path)?)?),
        None => Ok(ExploreConfig::default()),
    }
}

fn main() {
    env_logger::init();
    if let Err(e) = run() {
        eprintln!("{}", e);
        std::process::exit(1);
    }
}

fn run() -> Result<(), Box<dyn Error>> {
    let config = load_config()?;
    config.population.validate()?;

    let sessions: Vec<Session> = (0..config.sessions)
        .into_par_iter()
        .map(|i| run_session(&config, config.seed + i as u64))
        .collect::<biomorph_host::Result<_>>()?;

    for (i, session) in sessions.iter().enumerate() {
        println!("session {}: {}", i, session.explorer.summary());
    }
    let best: Vec<(usize, usize, f64)> = sessions
        .iter()
        .enumerate()
        .filter_map(|(i, s)| s.best().map(|(index, value)| (i, index, value)))
        .collect();
    println!(
        "Final slenderness over {} sessions: {:?}",
        sessions.len(),
        Stats::from(best.iter().map(|(_, _, value)| *value))
    );
    println!(
        "Failed evaluations per session: {:?}",
        Stats::from(
            sessions
                .iter()
                .map(|s| s.explorer.population().failed_count() as f64)
        )
    );

    if let Some(first) = sessions.first() {
        let history = ron::ser::to_string_pretty(
            first.explorer.history(),
            ron::ser::PrettyConfig::new(),
        )?;
        fs::write(HISTORY_PATH, history)?;
        println!(
            "Wrote {} generations of session 0 to {}",
            first.explorer.history().len(),
            HISTORY_PATH
        );
    }

    if let Some(&(session, design, value)) = best.iter().max_by(|a, b| a.2.total_cmp(&b.2)) {
        let winner = &sessions[session];
        let reader = DesignReader::new(winner.document.clone(), winner.applicator.clone());
        let meshes = reader.apply(&winner.explorer.population().export_genes(), design)?;
        let values = winner
            .document
            .with_exclusive(|d| d.values().cloned())?
            .unwrap_or_default();
        println!(
            "Most slender tower: session {}, design {}, slenderness {:.2}, {} vertices, controls {:?}",
            session,
            design,
            value,
            meshes.iter().map(|m| m.vertices.len()).sum::<usize>(),
            values
        );
    }
    Ok(())
}
