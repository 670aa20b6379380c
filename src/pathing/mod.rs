//! Hierarchical terrain pathfinding in the style of MicroPather, with a
//! choke point pass on top to rate terrain tactically.
//!
//! [MicroPather](https://github.com/leethomason/MicroPather)
//!
//! [Amit's A* Pages](https://theory.stanford.edu/~amitp/GameProgramming/)
//!
//! A heightmap is down-sampled into a fine grid where each cell records its
//! height, its slope and which movement classes may occupy it. A single A*
//! engine searches that grid directly and also searches a coarse graph of
//! Blocks whose edge costs are cached from bounded fine searches.
//!
//! Data flows one way:
//!
//! ```text
//!  Heightmap ─► TraversabilityMap ─┬─► AStarSolver ─► PathResult
//!                                  │        ▲
//!                                  ├─► PathEstimator (coarse Blocks)
//!                                  │
//!                                  └─► ChokePointAnalyzer ─► ChokeOverlays
//! ```
//!
//! Definitions:
//!
//! * Cell - a square of the fine grid spanning `resolution` heightmap squares
//! along each side. The outermost ring of cells is never passable
//! * MoveClass - a movement profile (slope tolerance and water depth window)
//! owning one bit of each cell's traversability mask
//! * Block - a square of `block_size` cells acting as one node of the coarse
//! graph. Each block elects a centre cell per class
//! * Choke overlay - per class grid of accumulated kernel values, high where
//! many efficient paths cross
//!

pub mod blocks;
pub mod chokepoints;
pub mod config;
pub mod grid;
pub mod pathfinder;
pub mod solver;
pub mod utilities;
