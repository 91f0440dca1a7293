//! Particle field simulation and drawing
//!
//! - Node: one drifting point (position, velocity, radius)
//! - ParticleField: the node set, surface dimensions and pointer, plus the
//!   per-frame integrate/draw passes
//!
//! Platform-agnostic: draws through [`Surface`], so the same code runs against
//! a browser canvas, the CLI recorder and the tests.

use rand::rngs::SmallRng;
use rand::{Rng, SeedableRng};
use tracing::{debug, trace};

use super::config::FieldConfig;
use super::surface::{Point, Surface};
use crate::theme::Palette;

// ============================================================================
// Node
// ============================================================================

#[derive(Clone, Copy, Debug, PartialEq)]
pub struct Node {
    pub x: f64,
    pub y: f64,
    /// Velocity in surface units per frame
    pub vx: f64,
    pub vy: f64,
    /// Base radius, fixed at creation
    pub radius: f64,
}

impl Node {
    pub fn new(x: f64, y: f64, vx: f64, vy: f64, radius: f64) -> Self {
        Self { x, y, vx, vy, radius }
    }

    /// Random node inside `[0, width) x [0, height)`
    fn random(rng: &mut SmallRng, width: f64, height: f64, config: &FieldConfig) -> Self {
        Self {
            x: rng.gen::<f64>() * width,
            y: rng.gen::<f64>() * height,
            vx: (rng.gen::<f64>() - 0.5) * config.max_speed,
            vy: (rng.gen::<f64>() - 0.5) * config.max_speed,
            radius: rng.gen::<f64>() * config.radius_spread + config.min_radius,
        }
    }

    #[inline]
    pub fn pos(&self) -> Point {
        Point::new(self.x, self.y)
    }

    /// Advance one frame, reflecting off the `[0, width] x [0, height]` box.
    /// The position is not corrected, so a node may overshoot by one step.
    #[inline]
    fn integrate(&mut self, width: f64, height: f64) {
        self.x += self.vx;
        self.y += self.vy;
        if self.x < 0.0 || self.x > width {
            self.vx = -self.vx;
        }
        if self.y < 0.0 || self.y > height {
            self.vy = -self.vy;
        }
    }
}

// ============================================================================
// FrameStats
// ============================================================================

/// What a single draw pass produced
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub struct FrameStats {
    /// Normal edges stroked between close node pairs
    pub edges: usize,
    /// Nodes within pointer range
    pub near_nodes: usize,
    /// Highlighted edges stroked between pointer-near nodes
    pub glow_links: usize,
}

impl std::ops::AddAssign for FrameStats {
    fn add_assign(&mut self, rhs: Self) {
        self.edges += rhs.edges;
        self.near_nodes += rhs.near_nodes;
        self.glow_links += rhs.glow_links;
    }
}

// ============================================================================
// ParticleField
// ============================================================================

pub struct ParticleField {
    config: FieldConfig,
    nodes: Vec<Node>,
    width: f64,
    height: f64,
    /// Pointer in surface space; `None` while the pointer is outside the container
    pointer: Option<Point>,
    rng: SmallRng,
}

impl ParticleField {
    /// Create an empty field seeded from OS entropy. Call [`resize`](Self::resize)
    /// to size it and generate nodes.
    pub fn new(config: FieldConfig) -> Self {
        Self::with_rng(config, SmallRng::from_entropy())
    }

    /// Create an empty field with a deterministic node sequence
    pub fn with_seed(config: FieldConfig, seed: u64) -> Self {
        Self::with_rng(config, SmallRng::seed_from_u64(seed))
    }

    fn with_rng(config: FieldConfig, rng: SmallRng) -> Self {
        Self {
            nodes: Vec::with_capacity(config.node_count),
            config,
            width: 0.0,
            height: 0.0,
            pointer: None,
            rng,
        }
    }

    /// Set new surface dimensions and regenerate every node.
    /// Old positions are discarded, not rescaled.
    pub fn resize(&mut self, width: f64, height: f64) {
        self.width = width;
        self.height = height;
        self.regenerate();
    }

    fn regenerate(&mut self) {
        let Self {
            ref config,
            ref mut nodes,
            ref mut rng,
            width,
            height,
            ..
        } = *self;

        nodes.clear();
        nodes.extend((0..config.node_count).map(|_| Node::random(rng, width, height, config)));

        debug!(width, height, nodes = nodes.len(), "Regenerated particle field");
    }

    pub fn pointer_move(&mut self, x: f64, y: f64) {
        self.pointer = Some(Point::new(x, y));
    }

    pub fn pointer_leave(&mut self) {
        self.pointer = None;
    }

    /// Integrate every node by one frame
    pub fn step(&mut self) {
        let (width, height) = (self.width, self.height);
        for node in &mut self.nodes {
            node.integrate(width, height);
        }
    }

    /// Whether `node` is within pointer range
    #[inline]
    pub fn is_near(&self, node: &Node) -> bool {
        self.pointer
            .is_some_and(|p| node.pos().distance(p) < self.config.pointer_dist)
    }

    /// Clear the surface and draw edges, then nodes with pointer highlights
    pub fn draw<S: Surface + ?Sized>(&self, surface: &mut S, palette: &Palette) -> FrameStats {
        let cfg = &self.config;
        let mut stats = FrameStats::default();

        surface.clear(self.width, self.height);

        // Edges between every close pair
        for (i, a) in self.nodes.iter().enumerate() {
            for b in &self.nodes[i + 1..] {
                let dist = a.pos().distance(b.pos());
                if dist < cfg.connect_dist {
                    let color = palette.line.with_alpha(cfg.edge_alpha_at(dist));
                    surface.stroke_line(a.pos(), b.pos(), color, cfg.edge_width);
                    stats.edges += 1;
                }
            }
        }

        // Nodes, enlarged near the pointer, with brighter links among near nodes
        for (i, n) in self.nodes.iter().enumerate() {
            let near = self.is_near(n);
            if !near {
                surface.fill_circle(n.pos(), n.radius, palette.node);
                continue;
            }

            stats.near_nodes += 1;
            surface.fill_circle(n.pos(), n.radius * cfg.glow_scale, palette.glow);

            for (j, m) in self.nodes.iter().enumerate() {
                if i == j {
                    continue;
                }
                let dist = n.pos().distance(m.pos());
                if dist < cfg.connect_dist && self.is_near(m) {
                    let color = palette.glow_line.with_alpha(cfg.glow_alpha_at(dist));
                    surface.stroke_line(n.pos(), m.pos(), color, cfg.glow_width);
                    stats.glow_links += 1;
                }
            }
        }

        trace!(
            edges = stats.edges,
            near = stats.near_nodes,
            glow = stats.glow_links,
            "Frame drawn"
        );
        stats
    }

    pub fn nodes(&self) -> &[Node] {
        &self.nodes
    }

    pub fn dimensions(&self) -> (f64, f64) {
        (self.width, self.height)
    }

    pub fn pointer(&self) -> Option<Point> {
        self.pointer
    }

    pub fn config(&self) -> &FieldConfig {
        &self.config
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::core::surface::{DrawCommand, RecordingSurface, Rgba};
    use crate::theme::Theme;

    fn field(width: f64, height: f64) -> ParticleField {
        let mut f = ParticleField::with_seed(FieldConfig::default(), 7);
        f.resize(width, height);
        f
    }

    /// Field with hand-placed nodes
    fn field_with(nodes: Vec<Node>) -> ParticleField {
        let mut f = field(800.0, 600.0);
        f.nodes = nodes;
        f
    }

    fn line_colors(s: &RecordingSurface) -> Vec<(Rgba, f64)> {
        s.lines()
            .map(|c| match c {
                DrawCommand::Line { color, width, .. } => (*color, *width),
                _ => unreachable!(),
            })
            .collect()
    }

    #[test]
    fn test_generation_count_and_bounds() {
        let f = field(800.0, 600.0);
        assert_eq!(f.nodes().len(), 60);
        for n in f.nodes() {
            assert!((0.0..800.0).contains(&n.x));
            assert!((0.0..600.0).contains(&n.y));
            assert!(n.vx.abs() <= 0.2 && n.vy.abs() <= 0.2);
            assert!((1.5..3.5).contains(&n.radius));
        }
    }

    #[test]
    fn test_resize_regenerates_within_new_bounds() {
        let mut f = field(800.0, 600.0);
        let before = f.nodes().to_vec();
        f.resize(400.0, 300.0);

        assert_eq!(f.nodes().len(), 60);
        assert_eq!(f.dimensions(), (400.0, 300.0));
        assert_ne!(f.nodes(), &before[..], "nodes should be regenerated, not kept");
        for n in f.nodes() {
            assert!((0.0..=400.0).contains(&n.x), "x={} out of bounds", n.x);
            assert!((0.0..=300.0).contains(&n.y), "y={} out of bounds", n.y);
        }
    }

    #[test]
    fn test_count_stable_between_generations() {
        let mut f = field(500.0, 500.0);
        for _ in 0..1000 {
            f.step();
        }
        assert_eq!(f.nodes().len(), 60);
    }

    #[test]
    fn test_positions_stay_within_reflection_tolerance() {
        let mut f = field(120.0, 90.0);
        let eps = f.config().max_speed / 2.0 + 1e-9;
        for _ in 0..20_000 {
            f.step();
            for n in f.nodes() {
                assert!(n.x >= -eps && n.x <= 120.0 + eps, "x={} escaped", n.x);
                assert!(n.y >= -eps && n.y <= 90.0 + eps, "y={} escaped", n.y);
            }
        }
    }

    #[test]
    fn test_reflection_flips_velocity_without_clamping() {
        let mut f = field_with(vec![Node::new(799.9, 300.0, 0.2, 0.0, 2.0)]);
        f.step();
        let n = f.nodes()[0];
        assert!((n.x - 800.1).abs() < 1e-9, "position overshoots, not clamped");
        assert_eq!(n.vx, -0.2);
        assert_eq!(n.vy, 0.0);

        f.step();
        assert!((f.nodes()[0].x - 799.9).abs() < 1e-9);
    }

    #[test]
    fn test_zero_area_surface_is_tolerated() {
        let mut f = field(0.0, 0.0);
        assert_eq!(f.nodes().len(), 60);
        for _ in 0..100 {
            f.step();
        }
        let mut s = RecordingSurface::new();
        let stats = f.draw(&mut s, &Palette::for_theme(Theme::Light));
        // All nodes sit within one step of the origin, so every pair connects
        assert_eq!(stats.edges, 60 * 59 / 2);
    }

    #[test]
    fn test_edge_alpha_matches_distance() {
        let f = field_with(vec![
            Node::new(100.0, 100.0, 0.0, 0.0, 2.0),
            Node::new(200.0, 100.0, 0.0, 0.0, 2.0),
        ]);
        let mut s = RecordingSurface::new();
        let palette = Palette::for_theme(Theme::Light);
        let stats = f.draw(&mut s, &palette);

        assert_eq!(stats.edges, 1);
        let lines = line_colors(&s);
        assert_eq!(lines.len(), 1);
        let (color, width) = lines[0];
        let expected = (1.0 - 100.0 / 160.0) * 0.18;
        assert!((color.a - expected).abs() < 1e-12, "alpha {} != {}", color.a, expected);
        assert_eq!((color.r, color.g, color.b), (91, 106, 191));
        assert_eq!(width, 1.0);
    }

    #[test]
    fn test_no_edge_at_or_beyond_threshold() {
        let f = field_with(vec![
            Node::new(0.0, 0.0, 0.0, 0.0, 2.0),
            Node::new(160.0, 0.0, 0.0, 0.0, 2.0),
            Node::new(400.0, 0.0, 0.0, 0.0, 2.0),
        ]);
        let mut s = RecordingSurface::new();
        let stats = f.draw(&mut s, &Palette::for_theme(Theme::Dark));
        assert_eq!(stats.edges, 0);
        assert_eq!(s.lines().count(), 0);
        assert_eq!(s.circles().count(), 3);
    }

    #[test]
    fn test_coincident_nodes_draw_max_alpha() {
        let f = field_with(vec![
            Node::new(50.0, 50.0, 0.0, 0.0, 2.0),
            Node::new(50.0, 50.0, 0.0, 0.0, 2.0),
        ]);
        let mut s = RecordingSurface::new();
        f.draw(&mut s, &Palette::for_theme(Theme::Dark));
        let (color, _) = line_colors(&s)[0];
        assert!((color.a - 0.18).abs() < 1e-12);
    }

    #[test]
    fn test_pointer_on_node_highlights_it() {
        let mut f = field_with(vec![Node::new(300.0, 200.0, 0.0, 0.0, 2.5)]);
        f.pointer_move(300.0, 200.0);
        assert!(f.is_near(&f.nodes()[0]));

        let palette = Palette::for_theme(Theme::Dark);
        let mut s = RecordingSurface::new();
        let stats = f.draw(&mut s, &palette);
        assert_eq!(stats.near_nodes, 1);

        let circle = s.circles().next().unwrap();
        match circle {
            DrawCommand::Circle { radius, color, .. } => {
                assert!((radius - 2.5 * 1.8).abs() < 1e-12);
                assert_eq!(*color, palette.glow);
            }
            _ => unreachable!(),
        }
    }

    #[test]
    fn test_glow_links_only_between_mutually_near_close_nodes() {
        let mut f = field_with(vec![
            Node::new(100.0, 100.0, 0.0, 0.0, 2.0), // near pointer
            Node::new(180.0, 100.0, 0.0, 0.0, 2.0), // near pointer, 80 from #0
            Node::new(100.0, 250.0, 0.0, 0.0, 2.0), // 150 from #0 but 250 from pointer
            Node::new(700.0, 500.0, 0.0, 0.0, 2.0), // far from everything
        ]);
        f.pointer_move(100.0, 0.0);

        let palette = Palette::for_theme(Theme::Light);
        let mut s = RecordingSurface::new();
        let stats = f.draw(&mut s, &palette);

        assert_eq!(stats.near_nodes, 2);
        // #0-#1 stroked once from each side
        assert_eq!(stats.glow_links, 2);

        let glow: Vec<_> = line_colors(&s).into_iter().filter(|(_, w)| *w == 1.5).collect();
        assert_eq!(glow.len(), 2);
        let expected = (1.0 - 80.0 / 160.0) * 0.4;
        for (color, _) in glow {
            assert!((color.a - expected).abs() < 1e-12);
        }
    }

    #[test]
    fn test_pointer_leave_clears_highlight() {
        let mut f = field_with(vec![Node::new(10.0, 10.0, 0.0, 0.0, 2.0)]);
        f.pointer_move(10.0, 10.0);
        assert!(f.is_near(&f.nodes()[0]));
        f.pointer_leave();
        assert_eq!(f.pointer(), None);
        assert!(!f.is_near(&f.nodes()[0]));
    }

    #[test]
    fn test_no_pointer_never_highlights() {
        let mut f = field(300.0, 300.0);
        let mut s = RecordingSurface::new();
        let palette = Palette::for_theme(Theme::Light);
        for _ in 0..300 {
            f.step();
            let stats = f.draw(&mut s, &palette);
            assert_eq!(stats.near_nodes, 0);
            assert_eq!(stats.glow_links, 0);
            assert!(line_colors(&s).iter().all(|(_, w)| *w == 1.0));
        }
    }

    #[test]
    fn test_same_seed_same_nodes() {
        let a = field(640.0, 480.0);
        let b = field(640.0, 480.0);
        assert_eq!(a.nodes(), b.nodes());
    }
}
