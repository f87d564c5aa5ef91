//! Geovert session walkthrough — drives one vertex editing session
//! against the in-memory map surface.
//!
//! Usage:
//! ```text
//! cargo run --example session
//! ```
//!
//! Set `RUST_LOG=geovert=debug` to watch the session lifecycle.

use geovert::geometry::{Feature, Geometry};
use geovert::math::Point2;
use geovert::session::{
    FieldEdit, InteractionMode, Key, ModifyDragStart, VertexSessionController,
};
use geovert::view::MapSurface;

fn main() -> geovert::Result<()> {
    let env_filter = tracing_subscriber::EnvFilter::from_default_env()
        .add_directive(tracing_subscriber::filter::LevelFilter::WARN.into())
        .add_directive("geovert=debug".parse().unwrap_or_default());
    tracing_subscriber::fmt().with_env_filter(env_filter).init();

    let surface = MapSurface::new(Point2::new(5.0, 5.0), 100.0, 100.0);
    let mut controller = VertexSessionController::new(surface);

    let parcel = Feature::new(
        "parcel-42",
        Geometry::Polygon(vec![vec![
            Point2::new(0.0, 0.0),
            Point2::new(10.0, 0.0),
            Point2::new(10.0, 10.0),
            Point2::new(0.0, 10.0),
            Point2::new(0.0, 0.0),
        ]]),
    );

    controller.load_feature(parcel)?;

    // Table-side edits: focus a row, insert a midpoint vertex, nudge a
    // coordinate, walk the selection.
    controller.select_row(1)?;
    controller.add_vertex(2)?;
    controller.edit_row_field(1, FieldEdit::X(6.0))?;
    controller.key_input(Key::Down)?;

    // Map-side edits: drag the vertex we just moved, then drop it a
    // little further out.
    controller.set_mode(InteractionMode::ModifyWithInsert)?;
    controller.modify_begin(ModifyDragStart {
        coord: Point2::new(6.0, 0.0),
        snapped: true,
        segment_start: Point2::new(0.0, 0.0),
    })?;
    controller.modify_end(Point2::new(6.5, 0.75))?;

    let feature = controller.save()?;
    for event in controller.drain_events() {
        println!("event: {event:?}");
    }
    let ring = feature.geometry().first_ring()?;
    println!("committed ring: {ring:?}");

    controller.close();
    Ok(())
}
