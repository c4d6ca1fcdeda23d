// Generational optimizer over controller parameter vectors.

use crate::domain::controller::PARAMETER_COUNT;
use rand::Rng;

/// Fresh genes are drawn uniformly from `-INITIAL_RANGE..INITIAL_RANGE`.
pub const INITIAL_RANGE: f32 = 1.0;

/// Largest perturbation a single mutation applies to a gene.
pub const MUTATION_MAGNITUDE: f32 = 0.5;

/// Mutated genes are kept within `-GENE_LIMIT..=GENE_LIMIT`.
pub const GENE_LIMIT: f32 = 4.0;

/// Largest population a model will hold; larger requests are clamped.
pub const MAX_POPULATION: usize = 1000;

#[derive(Debug, Clone, PartialEq)]
pub struct Individual {
    pub parameters: Vec<f32>,
    pub fitness: f32,
}

impl Individual {
    pub fn new(parameters: Vec<f32>) -> Self {
        Self {
            parameters,
            fitness: 0.0,
        }
    }

    pub fn random(rng: &mut impl Rng) -> Self {
        let parameters = (0..PARAMETER_COUNT)
            .map(|_| rng.gen_range(-INITIAL_RANGE..INITIAL_RANGE))
            .collect();
        Self::new(parameters)
    }
}

/// Requested optimizer settings, possibly out of range.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct GeneticSettings {
    pub population_size: usize,
    pub elitism: i64,
    pub mutation_rate: f32,
}

impl GeneticSettings {
    /// Clamps population size to `MAX_POPULATION`, elitism into `0..=population_size`
    /// and mutation rate into `0.0..=1.0`.
    pub fn normalized(self) -> GeneticSettings {
        let population_size = self.population_size.min(MAX_POPULATION);
        let max_elitism = i64::try_from(population_size).unwrap_or(i64::MAX);
        let mutation_rate = if self.mutation_rate.is_nan() {
            0.0
        } else {
            self.mutation_rate.clamp(0.0, 1.0)
        };

        GeneticSettings {
            population_size,
            elitism: self.elitism.clamp(0, max_elitism),
            mutation_rate,
        }
    }

    pub fn elitism_count(&self) -> usize {
        usize::try_from(self.normalized().elitism).unwrap_or(0)
    }
}

impl Default for GeneticSettings {
    fn default() -> Self {
        Self {
            population_size: 30,
            elitism: 2,
            mutation_rate: 0.1,
        }
    }
}

#[derive(Debug, Clone)]
pub struct GeneticModel {
    settings: GeneticSettings,
    individuals: Vec<Individual>,
    generation: u32,
}

impl GeneticModel {
    /// Model with a random first generation.
    pub fn new(settings: GeneticSettings, rng: &mut impl Rng) -> Self {
        let settings = settings.normalized();
        let individuals = (0..settings.population_size)
            .map(|_| Individual::random(rng))
            .collect();
        Self {
            settings,
            individuals,
            generation: 0,
        }
    }

    /// Model seeded with an explicit population; the population size follows it.
    pub fn from_individuals(settings: GeneticSettings, mut individuals: Vec<Individual>) -> Self {
        individuals.truncate(MAX_POPULATION);
        let settings = GeneticSettings {
            population_size: individuals.len(),
            ..settings
        }
        .normalized();
        Self {
            settings,
            individuals,
            generation: 0,
        }
    }

    pub fn settings(&self) -> GeneticSettings {
        self.settings
    }

    pub fn population_size(&self) -> usize {
        self.settings.population_size
    }

    pub fn generation(&self) -> u32 {
        self.generation
    }

    pub fn individuals(&self) -> &[Individual] {
        &self.individuals
    }

    pub fn individuals_mut(&mut self) -> &mut [Individual] {
        &mut self.individuals
    }

    /// Updates elitism and mutation rate. Population size is fixed for the model's lifetime.
    pub fn configure(&mut self, elitism: i64, mutation_rate: f32) {
        self.settings = GeneticSettings {
            elitism,
            mutation_rate,
            ..self.settings
        }
        .normalized();
    }

    pub fn reset_fitness(&mut self) {
        for individual in &mut self.individuals {
            individual.fitness = 0.0;
        }
    }

    /// Individuals sorted best-first. The sort is stable: equal fitness keeps index order.
    pub fn ranked(&self) -> Vec<Individual> {
        let mut ranked = self.individuals.clone();
        ranked.sort_by(|a, b| b.fitness.total_cmp(&a.fitness));
        ranked
    }

    /// Breeds the next generation and returns the previous one, ranked best-first.
    ///
    /// The top `elitism` individuals carry over untouched; the rest are children of two
    /// rank-selected parents with uniform crossover followed by mutation. All fitness
    /// values start at zero again.
    pub fn evolve(&mut self, rng: &mut impl Rng) -> Vec<Individual> {
        let ranked = self.ranked();
        let size = ranked.len();
        let elites = self.settings.elitism_count().min(size);

        let mut next: Vec<Individual> = ranked[..elites]
            .iter()
            .map(|elite| Individual::new(elite.parameters.clone()))
            .collect();

        while next.len() < size {
            let mother = &ranked[select_rank(size, rng)];
            let father = &ranked[select_rank(size, rng)];
            let mut genes = crossover(&mother.parameters, &father.parameters, rng);
            mutate(&mut genes, self.settings.mutation_rate, rng);
            next.push(Individual::new(genes));
        }

        self.individuals = next;
        self.generation += 1;
        ranked
    }
}

/// Rank-weighted roulette over a best-first ranking: rank 0 has weight `size`, the
/// last rank weight 1.
fn select_rank(size: usize, rng: &mut impl Rng) -> usize {
    let total = size * (size + 1) / 2;
    let mut ticket = rng.gen_range(0..total);
    for rank in 0..size {
        let weight = size - rank;
        if ticket < weight {
            return rank;
        }
        ticket -= weight;
    }
    size - 1
}

/// Each gene comes from one parent or the other with equal odds.
pub fn crossover(a: &[f32], b: &[f32], rng: &mut impl Rng) -> Vec<f32> {
    a.iter()
        .zip(b)
        .map(|(x, y)| if rng.gen_bool(0.5) { *x } else { *y })
        .collect()
}

/// Perturbs each gene with probability `rate`. A rate of zero never touches a gene.
pub fn mutate(genes: &mut [f32], rate: f32, rng: &mut impl Rng) {
    if rate <= 0.0 {
        return;
    }
    for gene in genes {
        if rng.r#gen::<f32>() < rate {
            *gene = (*gene + rng.gen_range(-MUTATION_MAGNITUDE..MUTATION_MAGNITUDE))
                .clamp(-GENE_LIMIT, GENE_LIMIT);
        }
    }
}
