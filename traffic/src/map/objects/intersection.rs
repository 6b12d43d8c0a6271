use crate::map::{
    LightController, RouteID, SensorKind, COMMENT_PREFIX, FIELD_SEPARATOR, LIST_SEPARATOR,
};
use slotmapd::new_key_type;
use std::cell::{Ref, RefCell};
use std::fmt::{Display, Formatter};
use std::hash::{Hash, Hasher};
use std::rc::Rc;

new_key_type! {
    pub struct IntersectionID;
}

/// A named node of the network. Intersections compare and hash by name only.
#[derive(Debug)]
pub struct Intersection {
    pub id: IntersectionID,
    name: String,

    // incoming routes, in light cycle order once lights are added
    pub(crate) incoming: Vec<RouteID>,

    pub(crate) lights: Option<Rc<RefCell<LightController>>>,
}

impl Intersection {
    pub(crate) fn new(id: IntersectionID, name: String) -> Self {
        Self {
            id,
            name,
            incoming: Vec::new(),
            lights: None,
        }
    }

    /// Names must survive the network format: non blank, on a single line, free of
    /// separators, not read as a comment and not a sensor code.
    pub fn is_valid_name(name: &str) -> bool {
        !name.trim().is_empty()
            && !name.starts_with(COMMENT_PREFIX)
            && !name.contains(&[FIELD_SEPARATOR, LIST_SEPARATOR, '\n', '\r'][..])
            && !SensorKind::is_code(name)
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn incoming(&self) -> &[RouteID] {
        &self.incoming
    }

    pub fn has_traffic_lights(&self) -> bool {
        self.lights.is_some()
    }

    pub fn lights(&self) -> Option<Ref<'_, LightController>> {
        self.lights.as_ref().map(|l| l.borrow())
    }
}

impl PartialEq for Intersection {
    fn eq(&self, other: &Self) -> bool {
        self.name == other.name
    }
}

impl Eq for Intersection {}

impl Hash for Intersection {
    fn hash<H: Hasher>(&self, state: &mut H) {
        self.name.hash(state)
    }
}

impl Display for Intersection {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        f.write_str(&self.name)?;
        if let Some(lights) = self.lights() {
            write!(f, "{}{}", FIELD_SEPARATOR, lights)?;
        }
        Ok(())
    }
}
