//! Triangle-list tessellation for 2D primitives
//!
//! Every helper appends into a caller-owned buffer so a whole frame is built
//! in one allocation.

use glam::Vec2;
use std::f32::consts::TAU;

use super::vertex::Vertex;

#[inline]
fn push_tri(out: &mut Vec<Vertex>, a: Vec2, b: Vec2, c: Vec2, color: [f32; 4]) {
    out.push(Vertex::new(a.x, a.y, color));
    out.push(Vertex::new(b.x, b.y, color));
    out.push(Vertex::new(c.x, c.y, color));
}

#[inline]
fn on_circle(center: Vec2, radius: f32, theta: f32) -> Vec2 {
    center + Vec2::new(theta.cos(), theta.sin()) * radius
}

/// Replace the alpha channel of a color
#[inline]
pub fn with_alpha(color: [f32; 4], alpha: f32) -> [f32; 4] {
    [color[0], color[1], color[2], alpha.clamp(0.0, 1.0)]
}

/// Filled circle as a triangle fan
pub fn circle(out: &mut Vec<Vertex>, center: Vec2, radius: f32, color: [f32; 4], segments: u32) {
    let segments = segments.max(3);
    out.reserve((segments * 3) as usize);

    for i in 0..segments {
        let theta1 = (i as f32 / segments as f32) * TAU;
        let theta2 = ((i + 1) as f32 / segments as f32) * TAU;
        push_tri(
            out,
            center,
            on_circle(center, radius, theta1),
            on_circle(center, radius, theta2),
            color,
        );
    }
}

/// Hollow circle band between two radii
pub fn ring(
    out: &mut Vec<Vertex>,
    center: Vec2,
    inner_radius: f32,
    outer_radius: f32,
    color: [f32; 4],
    segments: u32,
) {
    let segments = segments.max(3);
    out.reserve((segments * 6) as usize);

    for i in 0..segments {
        let theta1 = (i as f32 / segments as f32) * TAU;
        let theta2 = ((i + 1) as f32 / segments as f32) * TAU;

        let inner1 = on_circle(center, inner_radius, theta1);
        let outer1 = on_circle(center, outer_radius, theta1);
        let inner2 = on_circle(center, inner_radius, theta2);
        let outer2 = on_circle(center, outer_radius, theta2);

        // Two triangles per segment
        push_tri(out, inner1, outer1, inner2, color);
        push_tri(out, inner2, outer1, outer2, color);
    }
}

/// Axis-aligned rectangle from its min and max corners
pub fn rect(out: &mut Vec<Vertex>, min: Vec2, max: Vec2, color: [f32; 4]) {
    let a = min;
    let b = Vec2::new(max.x, min.y);
    let c = max;
    let d = Vec2::new(min.x, max.y);
    push_tri(out, a, b, c, color);
    push_tri(out, a, c, d, color);
}

/// Thick line segment
pub fn line(out: &mut Vec<Vertex>, from: Vec2, to: Vec2, width: f32, color: [f32; 4]) {
    let dir = (to - from).normalize_or_zero();
    if dir == Vec2::ZERO {
        return;
    }
    let perp = Vec2::new(-dir.y, dir.x) * (width * 0.5);
    push_tri(out, from + perp, from - perp, to + perp, color);
    push_tri(out, to + perp, from - perp, to - perp, color);
}

/// Line with a triangular head at `to`
pub fn arrow(out: &mut Vec<Vertex>, from: Vec2, to: Vec2, width: f32, color: [f32; 4]) {
    let span = to - from;
    let dir = span.normalize_or_zero();
    if dir == Vec2::ZERO {
        return;
    }
    let head = (width * 2.5).min(span.length());
    let neck = to - dir * head;
    line(out, from, neck, width, color);

    let perp = Vec2::new(-dir.y, dir.x) * (width * 1.5);
    push_tri(out, neck + perp, neck - perp, to, color);
}

/// Small plus-shaped crosshair
pub fn crosshair(out: &mut Vec<Vertex>, center: Vec2, size: f32, width: f32, color: [f32; 4]) {
    line(
        out,
        center - Vec2::X * size,
        center + Vec2::X * size,
        width,
        color,
    );
    line(
        out,
        center - Vec2::Y * size,
        center + Vec2::Y * size,
        width,
        color,
    );
}
