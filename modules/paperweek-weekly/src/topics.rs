//! Canned search topics for the weekly publication.

use rand::Rng;

/// Fixed pool of science subtopics; one is drawn per pipeline run.
pub const SEARCH_TOPICS: [&str; 12] = [
    "latest breakthrough scientific research 2024",
    "recent peer-reviewed scientific discoveries",
    "new medical research findings",
    "climate science recent studies",
    "artificial intelligence research papers",
    "space exploration recent discoveries",
    "quantum physics breakthrough research",
    "biotechnology recent developments",
    "renewable energy scientific advances",
    "neuroscience recent studies",
    "materials science innovations",
    "cancer research breakthroughs",
];

/// Pick one topic uniformly at random.
pub fn pick_topic() -> &'static str {
    let idx = rand::rng().random_range(0..SEARCH_TOPICS.len());
    SEARCH_TOPICS[idx]
}
