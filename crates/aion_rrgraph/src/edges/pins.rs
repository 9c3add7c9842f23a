//! SOURCE -> OPIN and IPIN -> SINK edges, and the tile nodes.

use crate::context::BuildContext;
use crate::error::RrGraphError;
use crate::graph::{GraphBuilder, RrNode, RrType};
use crate::indices::pin_node;
use aion_arch::PinType;
use aion_common::{Direction, SideSet};

/// Connects every pin to the SOURCE or SINK of its class through the
/// delayless switch and initializes the SOURCE, SINK, OPIN, and IPIN nodes.
pub(crate) fn add_pin_edges(ctx: &BuildContext<'_>, builder: &mut GraphBuilder) -> Result<usize, RrGraphError> {
    let grid = &ctx.arch.grid;
    let rc = builder.rc_index(0.0, 0.0);
    let mut count = 0;
    for (layer, x, y) in grid.roots() {
        let tile = ctx.arch.tile_type(grid.tile_type(layer, x, y));
        let x_high = (x + tile.width - 1).min(ctx.width() - 1);
        let y_high = (y + tile.height - 1).min(ctx.height() - 1);

        for (class, info) in tile.classes.iter().enumerate() {
            let (kind, cost_index) = match info.kind {
                PinType::Driver => (RrType::Source, 0),
                PinType::Receiver => (RrType::Sink, 1),
            };
            let Some(class_node) = builder.lookup().find(layer, x, y, kind, class, None) else {
                continue;
            };
            for &pin in &info.pins {
                let Some((pin_id, _, _)) = pin_node(builder.lookup(), tile, layer, x, y, pin) else {
                    continue;
                };
                match info.kind {
                    PinType::Driver => builder.propose_edge(class_node, pin_id, ctx.delayless_switch),
                    PinType::Receiver => builder.propose_edge(pin_id, class_node, ctx.delayless_switch),
                }
                count += 1;
            }
            builder.init_node(
                class_node,
                RrNode {
                    kind,
                    layer_low: layer,
                    layer_high: layer,
                    x_low: x,
                    y_low: y,
                    x_high,
                    y_high,
                    ptc: class,
                    sides: SideSet::EMPTY,
                    direction: Direction::None,
                    capacity: info.pins.len() as u32,
                    cost_index,
                    rc,
                },
            )?;
        }

        for pin in 0..tile.num_pins() {
            let Some((id, (cx, cy), sides)) = pin_node(builder.lookup(), tile, layer, x, y, pin) else {
                continue;
            };
            let (kind, cost_index) = match tile.pin_type(pin) {
                PinType::Driver => (RrType::Opin, 2),
                PinType::Receiver => (RrType::Ipin, 3),
            };
            builder.init_node(
                id,
                RrNode {
                    kind,
                    layer_low: layer,
                    layer_high: layer,
                    x_low: cx,
                    y_low: cy,
                    x_high: cx,
                    y_high: cy,
                    ptc: pin,
                    sides,
                    direction: Direction::None,
                    capacity: 1,
                    cost_index,
                    rc,
                },
            )?;
        }
    }
    Ok(count)
}
