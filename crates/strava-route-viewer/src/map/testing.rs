//! In-memory render surface that records every call, for tests

use super::surface::{
    ControlPosition, FitBoundsOptions, LineLayer, MapControl, RenderSurface, SurfaceError,
    SurfaceEvent, SurfaceFactory, SurfaceOptions, SurfaceResult,
};
use geo::{LineString, Rect};
use std::cell::Cell;
use std::collections::{BTreeMap, VecDeque};
use std::rc::Rc;

#[derive(Debug, Clone, PartialEq)]
pub enum Op {
    SetStyle(String),
    AddControl(MapControl, ControlPosition),
    RemoveLayer(String),
    RemoveSource(String),
    AddSource(String, usize),
    AddLayer(LineLayer),
    FitBounds(Rect<f64>, FitBoundsOptions),
}

pub struct FakeSurface {
    pub style: String,
    pub ops: Vec<Op>,
    pub sources: BTreeMap<String, LineString<f64>>,
    pub layers: BTreeMap<String, LineLayer>,
    pub events: VecDeque<SurfaceEvent>,
    pub loaded: bool,
    /// Number of upcoming `add_source` calls to reject
    pub fail_add_source: usize,
    /// Number of upcoming `add_layer` calls to reject
    pub fail_add_layer: usize,
    released: Rc<Cell<usize>>,
}

impl FakeSurface {
    pub fn emit(&mut self, event: SurfaceEvent) {
        if event == SurfaceEvent::Load {
            self.loaded = true;
        }
        self.events.push_back(event);
    }

    pub fn count(&self, pred: impl Fn(&Op) -> bool) -> usize {
        self.ops.iter().filter(|op| pred(op)).count()
    }

    pub fn position(&self, pred: impl Fn(&Op) -> bool) -> Option<usize> {
        self.ops.iter().position(pred)
    }

    fn check_alive(&self) -> SurfaceResult<()> {
        if self.released.get() > 0 {
            return Err(SurfaceError::Released);
        }
        Ok(())
    }
}

impl RenderSurface for FakeSurface {
    fn set_style(&mut self, style: &str) -> SurfaceResult<()> {
        self.check_alive()?;
        if style.starts_with("no-such") {
            return Err(SurfaceError::UnknownStyle(style.to_string()));
        }
        self.ops.push(Op::SetStyle(style.to_string()));
        self.style = style.to_string();
        self.sources.clear();
        self.layers.clear();
        self.events.push_back(SurfaceEvent::StyleLoaded);
        Ok(())
    }

    fn add_control(&mut self, control: MapControl, position: ControlPosition) {
        self.ops.push(Op::AddControl(control, position));
    }

    fn has_layer(&self, id: &str) -> bool {
        self.layers.contains_key(id)
    }

    fn has_source(&self, id: &str) -> bool {
        self.sources.contains_key(id)
    }

    fn remove_layer(&mut self, id: &str) -> SurfaceResult<()> {
        self.check_alive()?;
        self.layers
            .remove(id)
            .ok_or_else(|| SurfaceError::MissingLayer(id.to_string()))?;
        self.ops.push(Op::RemoveLayer(id.to_string()));
        Ok(())
    }

    fn remove_source(&mut self, id: &str) -> SurfaceResult<()> {
        self.check_alive()?;
        if let Some(layer) = self.layers.values().find(|layer| layer.source == id) {
            return Err(SurfaceError::SourceInUse {
                source_id: id.to_string(),
                layer_id: layer.id.clone(),
            });
        }
        self.sources
            .remove(id)
            .ok_or_else(|| SurfaceError::MissingSource(id.to_string()))?;
        self.ops.push(Op::RemoveSource(id.to_string()));
        Ok(())
    }

    fn add_source(&mut self, id: &str, geometry: LineString<f64>) -> SurfaceResult<()> {
        self.check_alive()?;
        if self.fail_add_source > 0 {
            self.fail_add_source -= 1;
            return Err(SurfaceError::InvalidGeometry(id.to_string()));
        }
        if self.sources.contains_key(id) {
            return Err(SurfaceError::DuplicateSource(id.to_string()));
        }
        self.ops.push(Op::AddSource(id.to_string(), geometry.0.len()));
        self.sources.insert(id.to_string(), geometry);
        Ok(())
    }

    fn add_layer(&mut self, layer: LineLayer) -> SurfaceResult<()> {
        self.check_alive()?;
        if self.fail_add_layer > 0 {
            self.fail_add_layer -= 1;
            return Err(SurfaceError::DuplicateLayer(layer.id));
        }
        if self.layers.contains_key(&layer.id) {
            return Err(SurfaceError::DuplicateLayer(layer.id));
        }
        if !self.sources.contains_key(&layer.source) {
            return Err(SurfaceError::MissingSource(layer.source));
        }
        self.ops.push(Op::AddLayer(layer.clone()));
        self.layers.insert(layer.id.clone(), layer);
        Ok(())
    }

    fn fit_bounds(&mut self, bounds: Rect<f64>, options: FitBoundsOptions) {
        self.ops.push(Op::FitBounds(bounds, options));
    }

    fn is_loaded(&self) -> bool {
        self.loaded
    }

    fn poll_event(&mut self) -> Option<SurfaceEvent> {
        self.events.pop_front()
    }

    fn release(&mut self) {
        self.released.set(self.released.get() + 1);
    }
}

#[derive(Default)]
pub struct FakeFactory {
    pub constructed: Vec<SurfaceOptions>,
    pub fail_construct: bool,
    pub loaded_on_construct: bool,
    /// Total `release` calls across every surface built by this factory
    pub releases: Rc<Cell<usize>>,
}

impl SurfaceFactory for FakeFactory {
    type Surface = FakeSurface;

    fn construct(&mut self, options: &SurfaceOptions) -> SurfaceResult<FakeSurface> {
        if self.fail_construct {
            return Err(SurfaceError::UnknownStyle(options.style.clone()));
        }
        self.constructed.push(options.clone());
        Ok(FakeSurface {
            style: options.style.clone(),
            ops: Vec::new(),
            sources: BTreeMap::new(),
            layers: BTreeMap::new(),
            events: VecDeque::new(),
            loaded: self.loaded_on_construct,
            fail_add_source: 0,
            fail_add_layer: 0,
            released: self.releases.clone(),
        })
    }
}
