//! Name resolution and validation: [`ArchDescription`] to [`Architecture`].

use crate::arch::{Architecture, RoutingParams};
use crate::desc::{
    ArchDescription, DirectDesc, FcDesc, FcValueDesc, FcValueKind, GridDesc, LocationKind,
    PinPattern, PortDesc, PortKind, ScatterGatherDesc, SegmentDesc, SwitchBlockDesc,
    SwitchpointDesc, TileDesc, WireconnDesc, XyDesc,
};
use crate::direct::DirectInf;
use crate::error::ArchError;
use crate::grid::DeviceGrid;
use crate::ids::{SegmentId, SwitchId, TileTypeId};
use crate::pin_ref::parse_pin_ref;
use crate::scatter_gather::{ScatterGatherPattern, SgLink, SgLocation};
use crate::segment::{Directionality, SegmentInf};
use crate::switch::{ArchSwitch, SwitchKind, SwitchOverride};
use crate::switchblock::{
    AxisSpec, SbLocation, SidePermutation, SwitchBlockInf, WireSwitchpoints, WireconnInf, XySpec,
};
use crate::tile::{FcSpec, FcType, FcValueType, PhysicalTileType, PinClass, PinLoc, PinType};
use aion_common::Side;
use std::collections::HashMap;

/// Name of the switch appended to every architecture for zero-delay hookups.
pub const DELAYLESS_SWITCH_NAME: &str = "__delayless__";

impl Architecture {
    /// Resolves every name in `desc` to a typed id and validates the result.
    pub fn resolve(desc: ArchDescription) -> Result<Self, ArchError> {
        let mut names = Names::default();

        let mut switches = desc.switches;
        for (i, sw) in switches.iter().enumerate() {
            if names.switches.insert(sw.name.clone(), SwitchId::from_index(i)).is_some() {
                return Err(ArchError::invalid(
                    format!("switch '{}'", sw.name),
                    "declared twice",
                ));
            }
        }
        let delayless_switch = SwitchId::from_index(switches.len());
        switches.push(ArchSwitch {
            name: DELAYLESS_SWITCH_NAME.to_string(),
            kind: SwitchKind::Mux,
            r: 0.0,
            cin: 0.0,
            cout: 0.0,
            tdel: 0.0,
        });
        names
            .switches
            .insert(DELAYLESS_SWITCH_NAME.to_string(), delayless_switch);

        let routing = RoutingParams {
            directionality: desc.routing.directionality,
            sb_type: desc.routing.switch_block_type,
            fs: desc.routing.fs,
            wire_to_ipin_switch: names.switch("routing", &desc.routing.wire_to_ipin_switch)?,
            wire_to_ipin_switch_between_dice: desc
                .routing
                .wire_to_ipin_switch_between_dice
                .as_deref()
                .map(|n| names.switch("routing", n))
                .transpose()?,
            delayless_switch,
        };

        let mut segments = Vec::with_capacity(desc.segments.len());
        for seg in &desc.segments {
            let id = SegmentId::from_index(segments.len());
            if names.segments.insert(seg.name.clone(), id).is_some() {
                return Err(ArchError::invalid(
                    format!("segment '{}'", seg.name),
                    "declared twice",
                ));
            }
            segments.push(resolve_segment(seg, routing.directionality, &names)?);
        }

        let mut tile_types = vec![PhysicalTileType::empty()];
        names
            .tiles
            .insert(tile_types[0].name.clone(), TileTypeId::EMPTY);
        let mut tile_ports = vec![PortTable::default()];
        for tile in &desc.tiles {
            let id = TileTypeId::from_index(tile_types.len());
            if names.tiles.insert(tile.name.clone(), id).is_some() {
                return Err(ArchError::invalid(
                    format!("tile '{}'", tile.name),
                    "declared twice",
                ));
            }
            let ports = PortTable::new(&tile.ports);
            tile_types.push(resolve_tile(tile, &ports, &segments, &names)?);
            tile_ports.push(ports);
        }

        let grid = resolve_grid(&desc.grid, &tile_types, &names)?;

        let switchblocks = desc
            .switchblocks
            .iter()
            .map(|sb| resolve_switchblock(sb, routing.directionality, &names))
            .collect::<Result<Vec<_>, _>>()?;

        let scatter_gather = desc
            .scatter_gather
            .iter()
            .map(|sg| resolve_scatter_gather(sg, routing.directionality, &names))
            .collect::<Result<Vec<_>, _>>()?;

        let directs = desc
            .directs
            .iter()
            .map(|d| resolve_direct(d, &tile_ports, &names, delayless_switch))
            .collect::<Result<Vec<_>, _>>()?;

        Ok(Architecture {
            routing,
            switches,
            segments,
            tile_types,
            grid,
            switchblocks,
            scatter_gather,
            directs,
        })
    }
}

#[derive(Default)]
struct Names {
    switches: HashMap<String, SwitchId>,
    segments: HashMap<String, SegmentId>,
    tiles: HashMap<String, TileTypeId>,
}

impl Names {
    fn switch(&self, context: &str, name: &str) -> Result<SwitchId, ArchError> {
        self.switches
            .get(name)
            .copied()
            .ok_or_else(|| ArchError::UnknownSwitch {
                context: context.to_string(),
                name: name.to_string(),
            })
    }

    fn segment(&self, context: &str, name: &str) -> Result<SegmentId, ArchError> {
        self.segments
            .get(name)
            .copied()
            .ok_or_else(|| ArchError::UnknownSegment {
                context: context.to_string(),
                name: name.to_string(),
            })
    }

    fn tile(&self, context: &str, name: &str) -> Result<TileTypeId, ArchError> {
        self.tiles
            .get(name)
            .copied()
            .ok_or_else(|| ArchError::UnknownTile {
                context: context.to_string(),
                name: name.to_string(),
            })
    }
}

fn resolve_segment(
    seg: &SegmentDesc,
    default_dir: Directionality,
    names: &Names,
) -> Result<SegmentInf, ArchError> {
    let context = format!("segment '{}'", seg.name);
    if seg.length == 0 {
        return Err(ArchError::invalid(context, "length must be at least 1"));
    }
    let directionality = seg.directionality.unwrap_or(default_dir);
    let named = |field: &Option<String>, what: &str| -> Result<SwitchId, ArchError> {
        let name = field.as_deref().ok_or_else(|| {
            ArchError::invalid(context.clone(), format!("{what} switch is required"))
        })?;
        names.switch(&context, name)
    };
    let optional = |field: &Option<String>| -> Result<Option<SwitchId>, ArchError> {
        field.as_deref().map(|n| names.switch(&context, n)).transpose()
    };
    let (wire_switch, opin_switch, dec) = match directionality {
        Directionality::Unidir => {
            let mux = named(&seg.mux, "mux")?;
            (mux, mux, optional(&seg.mux_dec)?)
        }
        Directionality::Bidir => (
            named(&seg.wire_switch, "wire")?,
            named(&seg.opin_switch, "opin")?,
            None,
        ),
    };
    let cb = pattern(&context, "cb", seg.cb.as_deref(), seg.length, seg.longline)?;
    let sb = pattern(&context, "sb", seg.sb.as_deref(), seg.length + 1, seg.longline)?;
    Ok(SegmentInf {
        name: seg.name.clone(),
        length: seg.length,
        frequency: seg.freq,
        longline: seg.longline,
        parallel_axis: seg.axis,
        directionality,
        r_metal: seg.r_metal,
        c_metal: seg.c_metal,
        wire_switch,
        opin_switch,
        wire_switch_dec: dec,
        opin_switch_dec: dec,
        inter_die_switch: optional(&seg.inter_die_switch)?,
        cb,
        sb,
    })
}

fn pattern(
    context: &str,
    what: &str,
    bits: Option<&[u8]>,
    len: usize,
    longline: bool,
) -> Result<Vec<bool>, ArchError> {
    match bits {
        None => Ok(vec![true; len]),
        Some(bits) if !longline && bits.len() != len => Err(ArchError::invalid(
            context,
            format!("{what} pattern has {} entries, expected {len}", bits.len()),
        )),
        Some(bits) => Ok(bits.iter().map(|&b| b != 0).collect()),
    }
}

/// Per-sub-tile port layout of one tile type.
#[derive(Default)]
struct PortTable {
    /// Name to (first pin, pin count, kind).
    ports: HashMap<String, (usize, usize, PortKind)>,
    pins_per_sub_tile: usize,
}

impl PortTable {
    fn new(ports: &[PortDesc]) -> Self {
        let mut table = PortTable::default();
        for port in ports {
            table.ports.insert(
                port.name.clone(),
                (table.pins_per_sub_tile, port.count, port.kind),
            );
            table.pins_per_sub_tile += port.count;
        }
        table
    }

    /// Resolves `port[range]` to `(start, end)` sub-tile pin indices.
    fn pins(
        &self,
        context: &str,
        text: &str,
        port: &str,
        range: Option<(usize, usize)>,
    ) -> Result<(usize, usize), ArchError> {
        let bad = |reason: &str| ArchError::BadPin {
            context: context.to_string(),
            pin: text.to_string(),
            reason: reason.to_string(),
        };
        let &(base, count, _) = self.ports.get(port).ok_or_else(|| bad("no such port"))?;
        let (start, end) = range.unwrap_or((0, count.saturating_sub(1)));
        if start >= count || end >= count {
            return Err(bad("bit index out of range"));
        }
        Ok((base + start, base + end))
    }
}

fn resolve_tile(
    tile: &TileDesc,
    ports: &PortTable,
    segments: &[SegmentInf],
    names: &Names,
) -> Result<PhysicalTileType, ArchError> {
    let context = format!("tile '{}'", tile.name);
    if tile.width == 0 || tile.height == 0 || tile.capacity == 0 {
        return Err(ArchError::invalid(
            context,
            "width, height, and capacity must be at least 1",
        ));
    }
    let pps = ports.pins_per_sub_tile;
    let num_pins = pps * tile.capacity;

    let mut pin_names = Vec::with_capacity(num_pins);
    let mut pin_class = Vec::with_capacity(num_pins);
    let mut classes = Vec::new();
    let mut is_ignored_pin = Vec::with_capacity(num_pins);
    for z in 0..tile.capacity {
        let prefix = if tile.capacity > 1 {
            format!("{}[{z}]", tile.name)
        } else {
            tile.name.clone()
        };
        for port in &tile.ports {
            let kind = match port.kind {
                PortKind::Output => PinType::Driver,
                PortKind::Input | PortKind::Clock => PinType::Receiver,
            };
            let first = pin_names.len();
            for bit in 0..port.count {
                pin_names.push(format!("{prefix}.{}[{bit}]", port.name));
                is_ignored_pin.push(port.global);
                if port.equivalent {
                    pin_class.push(classes.len());
                } else {
                    pin_class.push(classes.len() + bit);
                }
            }
            if port.equivalent && port.count > 0 {
                classes.push(PinClass {
                    kind,
                    pins: (first..first + port.count).collect(),
                });
            } else {
                classes.extend((first..first + port.count).map(|pin| PinClass {
                    kind,
                    pins: vec![pin],
                }));
            }
        }
    }

    let pin_locs = if tile.pin_loc.is_empty() {
        spread_pins(tile, pps)
    } else {
        let mut locs = vec![Vec::new(); num_pins];
        for entry in &tile.pin_loc {
            if entry.x_offset >= tile.width || entry.y_offset >= tile.height || !entry.side.is_planar() {
                return Err(ArchError::invalid(
                    context.clone(),
                    format!(
                        "pin location ({}, {}, {}) is outside the tile",
                        entry.x_offset, entry.y_offset, entry.side
                    ),
                ));
            }
            let loc = PinLoc {
                width_offset: entry.x_offset,
                height_offset: entry.y_offset,
                side: entry.side,
            };
            for text in &entry.pins {
                let r = parse_pin_ref(text).map_err(|reason| ArchError::BadPin {
                    context: context.clone(),
                    pin: text.clone(),
                    reason,
                })?;
                let (start, end) = ports.pins(&context, text, r.port, r.range)?;
                let (lo, hi) = if start <= end { (start, end) } else { (end, start) };
                for z in 0..tile.capacity {
                    for pin in lo..=hi {
                        locs[z * pps + pin].push(loc);
                    }
                }
            }
        }
        locs
    };

    let routable = tile.ports.iter().any(|p| !p.global && p.count > 0);
    let fc_specs = match (&tile.fc, routable) {
        (Some(fc), _) => resolve_fc(&context, tile, fc, ports, segments, names)?,
        (None, false) => Vec::new(),
        (None, true) => {
            return Err(ArchError::invalid(
                context,
                "tile has routable pins but no fc table",
            ))
        }
    };

    let mut switchblock_locations = tile.switchblock_pattern.expand(tile.width, tile.height);
    for over in &tile.sb_loc {
        if over.x_offset >= tile.width || over.y_offset >= tile.height {
            return Err(ArchError::invalid(
                context,
                format!(
                    "switch-block override ({}, {}) is outside the tile",
                    over.x_offset, over.y_offset
                ),
            ));
        }
        switchblock_locations[over.y_offset * tile.width + over.x_offset] = over.sb_type;
    }

    Ok(PhysicalTileType {
        name: tile.name.clone(),
        width: tile.width,
        height: tile.height,
        capacity: tile.capacity,
        pin_names,
        pin_class,
        classes,
        is_ignored_pin,
        pin_locs,
        fc_specs,
        switchblock_locations,
    })
}

/// Places the pins of every sub-tile in even blocks over the candidate
/// (cell, side) positions, visited side by side, then column, then row.
fn spread_pins(tile: &TileDesc, pps: usize) -> Vec<Vec<PinLoc>> {
    let mut positions = Vec::new();
    for side in Side::PLANAR {
        for w in 0..tile.width {
            for h in 0..tile.height {
                let on_boundary = match side {
                    Side::Top => h + 1 == tile.height,
                    Side::Right => w + 1 == tile.width,
                    Side::Bottom => h == 0,
                    _ => w == 0,
                };
                if tile.pin_pattern == PinPattern::Perimeter && !on_boundary {
                    continue;
                }
                positions.push(PinLoc {
                    width_offset: w,
                    height_offset: h,
                    side,
                });
            }
        }
    }
    let n = positions.len();
    let mut per_sub_tile = Vec::with_capacity(pps);
    for (index, &loc) in positions.iter().enumerate() {
        let count = pps / n + usize::from(index < pps % n);
        per_sub_tile.extend(std::iter::repeat(loc).take(count));
    }
    (0..tile.capacity * pps)
        .map(|pin| vec![per_sub_tile[pin % pps]])
        .collect()
}

fn resolve_fc(
    context: &str,
    tile: &TileDesc,
    fc: &FcDesc,
    ports: &PortTable,
    segments: &[SegmentInf],
    names: &Names,
) -> Result<Vec<FcSpec>, ArchError> {
    for over in &fc.overrides {
        if let Some(port) = &over.port {
            if !ports.ports.contains_key(port) {
                return Err(ArchError::BadPin {
                    context: context.to_string(),
                    pin: port.clone(),
                    reason: "fc override names no port of the tile".to_string(),
                });
            }
        }
        if let Some(seg) = &over.segment {
            names.segment(context, seg)?;
        }
    }
    let pps = ports.pins_per_sub_tile;
    let mut specs = Vec::new();
    for (iseg, seg) in segments.iter().enumerate() {
        for port in tile.ports.iter().filter(|p| !p.global && p.count > 0) {
            let (fc_type, default) = match port.kind {
                PortKind::Output => (FcType::Out, fc.fc_out),
                PortKind::Input | PortKind::Clock => (FcType::In, fc.fc_in),
            };
            let mut chosen: (u8, FcValueDesc) = (0, default);
            for over in &fc.overrides {
                let port_ok = over.port.as_deref().map_or(Some(0), |p| (p == port.name).then_some(2));
                let seg_ok = over.segment.as_deref().map_or(Some(0), |s| (s == seg.name).then_some(1));
                if let (Some(a), Some(b)) = (port_ok, seg_ok) {
                    let score = 1 + a + b;
                    if score >= chosen.0 {
                        chosen = (score, over.fc());
                    }
                }
            }
            let &(base, count, _) = &ports.ports[&port.name];
            let pins = (0..tile.capacity)
                .flat_map(|z| (0..count).map(move |bit| z * pps + base + bit))
                .collect();
            let value = chosen.1;
            specs.push(FcSpec {
                fc_type,
                value_type: match value.value_type {
                    FcValueKind::Abs => FcValueType::Absolute,
                    FcValueKind::Frac => FcValueType::Fractional,
                },
                value: value.value,
                segment: SegmentId::from_index(iseg),
                pins,
            });
        }
    }
    Ok(specs)
}

fn resolve_grid(
    desc: &GridDesc,
    tile_types: &[PhysicalTileType],
    names: &Names,
) -> Result<DeviceGrid, ArchError> {
    let (w, h) = (desc.width, desc.height);
    if w < 3 || h < 3 {
        return Err(ArchError::GridTooSmall {
            width: w,
            height: h,
        });
    }
    if desc.layers == 0 {
        return Err(ArchError::invalid("grid", "layers must be at least 1"));
    }
    let mut grid = DeviceGrid::new(desc.layers, w, h);
    let size = |id: TileTypeId| {
        let t = &tile_types[id.index()];
        (t.width, t.height)
    };

    for layer in 0..desc.layers {
        if let Some(fill) = &desc.fill {
            let id = names.tile("grid fill", fill)?;
            let (tw, th) = size(id);
            for x in (0..w).step_by(tw) {
                for y in (0..h).step_by(th) {
                    grid.place(layer, x, y, id, tw, th);
                }
            }
        }
        if let Some(perimeter) = &desc.perimeter {
            let id = names.tile("grid perimeter", perimeter)?;
            let (tw, th) = size(id);
            for x in 0..w {
                for y in 0..h {
                    if x == 0 || y == 0 || x == w - 1 || y == h - 1 {
                        grid.place(layer, x, y, id, tw, th);
                    }
                }
            }
        }
        let corner = names.tile("grid corners", &desc.corners)?;
        let (cw, ch) = size(corner);
        for (x, y) in [(0, 0), (0, h - 1), (w - 1, 0), (w - 1, h - 1)] {
            grid.place(layer, x, y, corner, cw, ch);
        }
        for col in desc.columns.iter().filter(|c| c.layer.map_or(true, |l| l == layer)) {
            let id = names.tile("grid column", &col.tile)?;
            let (tw, th) = size(id);
            let incr_y = col.incr_y.unwrap_or(th).max(1);
            let mut x = col.x;
            while x < w {
                let mut y = col.start_y;
                while y + th < h {
                    grid.place(layer, x, y, id, tw, th);
                    y += incr_y;
                }
                if col.repeat_x == 0 {
                    break;
                }
                x += col.repeat_x;
            }
        }
        for single in desc.singles.iter().filter(|s| s.layer.map_or(true, |l| l == layer)) {
            let id = names.tile("grid single", &single.tile)?;
            let (tw, th) = size(id);
            if !grid.place(layer, single.x, single.y, id, tw, th) {
                return Err(ArchError::invalid(
                    format!("grid single '{}'", single.tile),
                    format!("does not fit at ({layer}, {}, {})", single.x, single.y),
                ));
            }
        }
    }

    if let Some(flags) = &desc.inter_cluster_routing {
        if flags.len() != desc.layers {
            return Err(ArchError::invalid(
                "grid",
                format!(
                    "inter_cluster_routing has {} entries for {} layers",
                    flags.len(),
                    desc.layers
                ),
            ));
        }
        for (layer, &enabled) in flags.iter().enumerate() {
            grid.set_inter_cluster_routing(layer, enabled);
        }
    }
    Ok(grid)
}

fn resolve_location(
    context: &str,
    kind: LocationKind,
    xy: &XyDesc,
) -> Result<SbLocation, ArchError> {
    Ok(match kind {
        LocationKind::Everywhere => SbLocation::Everywhere,
        LocationKind::Perimeter => SbLocation::Perimeter,
        LocationKind::Corner => SbLocation::Corner,
        LocationKind::Fringe => SbLocation::Fringe,
        LocationKind::Core => SbLocation::Core,
        LocationKind::XySpecified => {
            let axis = |exact: Option<usize>, start: Option<usize>, end, repeat, incr: Option<usize>| {
                match (exact, start) {
                    (Some(v), _) => AxisSpec::Exact(v),
                    (None, Some(start)) => AxisSpec::Region {
                        start,
                        end,
                        repeat,
                        incr: incr.unwrap_or(1).max(1),
                    },
                    (None, None) => AxisSpec::Any,
                }
            };
            let spec = XySpec {
                x: axis(xy.x, xy.x_start, xy.x_end, xy.x_repeat, xy.x_incr),
                y: axis(xy.y, xy.y_start, xy.y_end, xy.y_repeat, xy.y_incr),
            };
            if spec.x == AxisSpec::Any && spec.y == AxisSpec::Any {
                return Err(ArchError::invalid(
                    context,
                    "xy_specified location needs x/y coordinates or a region",
                ));
            }
            SbLocation::XySpecified(spec)
        }
    })
}

/// Parses `"lr"`, `"left-right"`, or `"left_right"` into a side pair.
fn parse_side_pair(key: &str) -> Option<(Side, Side)> {
    fn letter(c: char) -> Option<Side> {
        match c {
            't' => Some(Side::Top),
            'r' => Some(Side::Right),
            'b' => Some(Side::Bottom),
            'l' => Some(Side::Left),
            'a' => Some(Side::Above),
            'u' => Some(Side::Under),
            _ => None,
        }
    }
    fn word(w: &str) -> Option<Side> {
        Side::ALL
            .into_iter()
            .find(|s| s.to_string().eq_ignore_ascii_case(w))
    }
    let key = key.trim().to_ascii_lowercase();
    if let Some((a, b)) = key.split_once(['-', '_']) {
        return Some((word(a)?, word(b)?));
    }
    let mut chars = key.chars();
    match (chars.next(), chars.next(), chars.next()) {
        (Some(a), Some(b), None) => Some((letter(a)?, letter(b)?)),
        _ => None,
    }
}

fn resolve_wireconn(
    context: &str,
    wc: &WireconnDesc,
    names: &Names,
) -> Result<WireconnInf, ArchError> {
    let set = |points: &[SwitchpointDesc]| -> Result<Vec<WireSwitchpoints>, ArchError> {
        points
            .iter()
            .map(|p| {
                Ok(WireSwitchpoints {
                    segment: names.segment(context, &p.segment)?,
                    switchpoints: p.switchpoints.clone(),
                })
            })
            .collect()
    };
    let switch_override = match wc.switch_override.as_deref() {
        None | Some("default") => SwitchOverride::Default,
        Some("none") => SwitchOverride::NoSwitch,
        Some(name) => SwitchOverride::Switch(names.switch(context, name)?),
    };
    Ok(WireconnInf {
        from: set(&wc.from)?,
        to: set(&wc.to)?,
        num_conns: wc.num_conns.clone(),
        from_order: wc.from_order,
        to_order: wc.to_order,
        switch_override,
        sides: wc.sides,
    })
}

fn resolve_switchblock(
    sb: &SwitchBlockDesc,
    default_dir: Directionality,
    names: &Names,
) -> Result<SwitchBlockInf, ArchError> {
    let context = format!("switchblock '{}'", sb.name);
    let mut permutations = Vec::with_capacity(sb.permutations.len());
    for (key, functions) in &sb.permutations {
        let (from, to) = parse_side_pair(key).ok_or_else(|| {
            ArchError::invalid(context.clone(), format!("'{key}' is not a side pair"))
        })?;
        permutations.push(SidePermutation {
            from,
            to,
            functions: functions.clone(),
        });
    }
    Ok(SwitchBlockInf {
        name: sb.name.clone(),
        location: resolve_location(&context, sb.location, &sb.xy)?,
        directionality: sb.directionality.unwrap_or(default_dir),
        permutations,
        wireconns: sb
            .wireconns
            .iter()
            .map(|wc| resolve_wireconn(&context, wc, names))
            .collect::<Result<_, _>>()?,
    })
}

fn resolve_scatter_gather(
    sg: &ScatterGatherDesc,
    default_dir: Directionality,
    names: &Names,
) -> Result<ScatterGatherPattern, ArchError> {
    let context = format!("scatter_gather '{}'", sg.name);
    let links = sg
        .links
        .iter()
        .map(|l| {
            Ok(SgLink {
                name: l.name.clone(),
                switch: names.switch(&context, &l.switch)?,
                segment: names.segment(&context, &l.segment)?,
                x_offset: l.x_offset,
                y_offset: l.y_offset,
                z_offset: l.z_offset,
            })
        })
        .collect::<Result<Vec<_>, ArchError>>()?;
    let locations = sg
        .locations
        .iter()
        .map(|loc| {
            let link = links.iter().position(|l| l.name == loc.link).ok_or_else(|| {
                ArchError::invalid(context.clone(), format!("unknown link '{}'", loc.link))
            })?;
            Ok(SgLocation {
                location: resolve_location(&context, loc.location, &loc.xy)?,
                num: loc.num,
                link,
            })
        })
        .collect::<Result<Vec<_>, ArchError>>()?;
    Ok(ScatterGatherPattern {
        name: sg.name.clone(),
        directionality: sg.directionality.unwrap_or(default_dir),
        gather: resolve_wireconn(&context, &sg.gather, names)?,
        scatter: resolve_wireconn(&context, &sg.scatter, names)?,
        links,
        locations,
    })
}

fn resolve_direct(
    d: &DirectDesc,
    tile_ports: &[PortTable],
    names: &Names,
    delayless: SwitchId,
) -> Result<DirectInf, ArchError> {
    let context = format!("direct '{}'", d.name);
    let endpoint = |text: &str| -> Result<(TileTypeId, usize, usize), ArchError> {
        let r = parse_pin_ref(text).map_err(|reason| ArchError::BadPin {
            context: context.clone(),
            pin: text.to_string(),
            reason,
        })?;
        let tile_name = r.tile.ok_or_else(|| ArchError::BadPin {
            context: context.clone(),
            pin: text.to_string(),
            reason: "expected tile.port".to_string(),
        })?;
        let tile = names.tile(&context, tile_name)?;
        let (start, end) = tile_ports[tile.index()].pins(&context, text, r.port, r.range)?;
        Ok((tile, start, end))
    };
    let (from_tile, from_pin_start, from_pin_end) = endpoint(&d.from_pin)?;
    let (to_tile, to_pin_start, to_pin_end) = endpoint(&d.to_pin)?;
    Ok(DirectInf {
        name: d.name.clone(),
        from_tile,
        from_pin_start,
        from_pin_end,
        to_tile,
        to_pin_start,
        to_pin_end,
        x_offset: d.x_offset,
        y_offset: d.y_offset,
        sub_tile_offset: d.z_offset,
        switch: d
            .switch
            .as_deref()
            .map_or(Ok(delayless), |n| names.switch(&context, n))?,
        from_side: d.from_side,
        to_side: d.to_side,
    })
}
