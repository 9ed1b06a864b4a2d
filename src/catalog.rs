use std::collections::HashMap;

use crate::links::{LinkId, LinkTable};
use crate::scene_graph::{ObjectId, Scene, TransformSnapshot};

const TARGET_MARKER: &str = "target";
const HOVER_MARKER: &str = "hover";
const FAN_MARKER: &str = "fan";
const AC_MARKER: &str = "ac";
const BEAN_MARKER: &str = "bean";
const EMAIL_MARKER: &str = "email";

/// Hover animation recipe selector. Partner markers are checked first so a
/// door's window or knob never picks up the door's own recipe. After that the
/// driver markers are checked in declaration order; the first marker found in
/// a node name wins.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum HoverProfile {
    Umbrella,
    FrontDoor,
    PatioDoor,
    BackDoor,
    Dumpster,
    Breaker,
    Sign,
    /// Window of the front door, hovered on its own.
    FrontDoorWindow,
    /// Knob of the patio door, hovered on its own.
    PatioKnob,
    /// Window of the back door, hovered on its own.
    BackDoorWindow,
}

impl HoverProfile {
    const PARTNER_MARKERS: [(&'static str, HoverProfile); 3] = [
        ("front_door_window", HoverProfile::FrontDoorWindow),
        ("knob", HoverProfile::PatioKnob),
        ("back_door_window", HoverProfile::BackDoorWindow),
    ];

    const MARKERS: [(&'static str, HoverProfile); 7] = [
        ("umb", HoverProfile::Umbrella),
        ("front", HoverProfile::FrontDoor),
        ("patio_door_glass", HoverProfile::PatioDoor),
        ("back_door_hover", HoverProfile::BackDoor),
        ("dumpster", HoverProfile::Dumpster),
        ("breaker", HoverProfile::Breaker),
        ("sign", HoverProfile::Sign),
    ];

    pub fn classify(name: &str) -> Option<HoverProfile> {
        Self::PARTNER_MARKERS
            .iter()
            .chain(Self::MARKERS.iter())
            .find(|(marker, _)| name.contains(marker))
            .map(|&(_, profile)| profile)
    }

    /// Marker of the node that swings together with this one.
    pub fn partner_marker(self) -> Option<&'static str> {
        match self {
            HoverProfile::FrontDoor => Some("front_door_window"),
            HoverProfile::PatioDoor => Some("knob"),
            HoverProfile::BackDoor => Some("back_door_window"),
            _ => None,
        }
    }

    /// The driver whose coupled recipe moves this node, for partner profiles.
    pub fn driver(self) -> Option<HoverProfile> {
        match self {
            HoverProfile::FrontDoorWindow => Some(HoverProfile::FrontDoor),
            HoverProfile::PatioKnob => Some(HoverProfile::PatioDoor),
            HoverProfile::BackDoorWindow => Some(HoverProfile::BackDoor),
            _ => None,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Rotor {
    /// Air-conditioner fan, spins around Y.
    AcFan,
    /// Sink fan, spins around X.
    SinkFan,
    /// Giant coffee bean, slow spin around Z.
    Bean,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ClickTarget {
    Link(LinkId),
    Email,
}

/// Everything the runtime needs to know about a node, decided once from its
/// name at load time.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct NodeTags {
    pub raycast_target: bool,
    pub hoverable: bool,
    pub rotor: Option<Rotor>,
    pub click: Option<ClickTarget>,
    pub profile: Option<HoverProfile>,
    pub initial: Option<TransformSnapshot>,
    pub partner: Option<ObjectId>,
}

#[derive(Default)]
pub struct Catalog {
    tags: HashMap<ObjectId, NodeTags>,
    pub raycast_targets: Vec<ObjectId>,
    pub hover_targets: Vec<ObjectId>,
    pub ac_fans: Vec<ObjectId>,
    pub sink_fans: Vec<ObjectId>,
    pub beans: Vec<ObjectId>,
    /// Coupled nodes whose partner was not found in the hover pool.
    pub missing_partners: Vec<ObjectId>,
}

impl Catalog {
    /// Sorts every mesh node into pools and resolves coupled partners.
    pub fn classify(scene: &Scene, links: &LinkTable) -> Catalog {
        let mut catalog = Catalog::default();

        for (id, object) in scene.mesh_objects() {
            let name = object.name.as_str();
            let mut tags = NodeTags::default();

            if name.contains(TARGET_MARKER) {
                tags.raycast_target = true;
                tags.click = match links.match_name(name) {
                    Some(link) => Some(ClickTarget::Link(link)),
                    None if name.contains(EMAIL_MARKER) => Some(ClickTarget::Email),
                    None => None,
                };
                catalog.raycast_targets.push(id);
            }

            if name.contains(HOVER_MARKER) {
                tags.hoverable = true;
                tags.profile = HoverProfile::classify(name);
                tags.initial = Some(object.transform.snapshot());
                catalog.hover_targets.push(id);
            }

            if name.contains(FAN_MARKER) {
                if name.contains(AC_MARKER) {
                    tags.rotor = Some(Rotor::AcFan);
                    catalog.ac_fans.push(id);
                } else {
                    tags.rotor = Some(Rotor::SinkFan);
                    catalog.sink_fans.push(id);
                }
            }

            if name.contains(BEAN_MARKER) {
                tags.rotor = Some(Rotor::Bean);
                catalog.beans.push(id);
            }

            if tags != NodeTags::default() {
                catalog.tags.insert(id, tags);
            }
        }

        catalog.resolve_partners(scene);

        log::info!(
            "Catalog: {} targets, {} hoverable, {} ac fans, {} sink fans, {} beans",
            catalog.raycast_targets.len(),
            catalog.hover_targets.len(),
            catalog.ac_fans.len(),
            catalog.sink_fans.len(),
            catalog.beans.len()
        );

        catalog
    }

    fn resolve_partners(&mut self, scene: &Scene) {
        for &id in &self.hover_targets {
            let Some(marker) = self
                .tags
                .get(&id)
                .and_then(|tags| tags.profile)
                .and_then(HoverProfile::partner_marker)
            else {
                continue;
            };

            let partner = self.hover_targets.iter().copied().find(|&candidate| {
                candidate != id
                    && scene
                        .get_object(candidate)
                        .is_some_and(|object| object.name.contains(marker))
            });

            if partner.is_none() {
                let name = scene.get_object(id).map_or("?", |object| object.name.as_str());
                log::warn!("No hover partner matching {marker:?} for {name}");
                self.missing_partners.push(id);
            }

            if let Some(tags) = self.tags.get_mut(&id) {
                tags.partner = partner;
            }
        }
    }

    pub fn tags(&self, id: ObjectId) -> Option<&NodeTags> {
        self.tags.get(&id)
    }

    pub fn is_hoverable(&self, id: ObjectId) -> bool {
        self.tags(id).is_some_and(|tags| tags.hoverable)
    }

    pub fn initial(&self, id: ObjectId) -> Option<TransformSnapshot> {
        self.tags(id).and_then(|tags| tags.initial)
    }
}
