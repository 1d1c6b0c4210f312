//! Lumped-node wires.
//!
//! Wire routes are handed to the engine node by node, without resampling.
//! Body fixed, connecting and winch nodes may only end a wire. A connecting
//! node is paired with a companion node at the center of mass of its
//! parent, on the outer side of the wire:
//!
//! ```text
//!   begin:  [CM] -> [connecting] -> ...
//!   end:    ... -> [connecting] -> [CM]
//! ```

use route_types::{Route, RouteNode, WireNodeType, WireRouteNode};
use tracing::{debug, error};

use crate::{
    CableError, NativeBinding, NativeWireNode, Result, WireConfig, WireEngine, WireProperty,
};

/// A wire described by a route and simulated by a native engine.
pub struct Wire<E: WireEngine> {
    config: WireConfig,
    route: Route<WireRouteNode>,
    engine: E,
    native: Option<E::Wire>,
}

impl<E: WireEngine> Wire<E> {
    /// Wire with default configuration and an empty route.
    pub fn new(engine: E) -> Self {
        Self::with_config(engine, WireConfig::default())
    }

    /// Wire with `config` and an empty route.
    pub fn with_config(engine: E, config: WireConfig) -> Self {
        Self {
            config,
            route: Route::new(),
            engine,
            native: None,
        }
    }

    /// Replace the route and return the wire.
    #[must_use]
    pub fn with_route(mut self, route: Route<WireRouteNode>) -> Self {
        self.route = route;
        self
    }

    /// Current configuration.
    pub const fn config(&self) -> &WireConfig {
        &self.config
    }

    /// The route.
    pub const fn route(&self) -> &Route<WireRouteNode> {
        &self.route
    }

    /// The route, for editing.
    pub fn route_mut(&mut self) -> &mut Route<WireRouteNode> {
        &mut self.route
    }

    /// The engine.
    pub const fn engine(&self) -> &E {
        &self.engine
    }

    /// The engine, mutably.
    pub fn engine_mut(&mut self) -> &mut E {
        &mut self.engine
    }

    /// The native wire, once initialized.
    pub const fn native(&self) -> Option<&E::Wire> {
        self.native.as_ref()
    }

    /// Returns `true` once [`initialize`](Self::initialize) succeeded.
    pub const fn is_initialized(&self) -> bool {
        self.native.is_some()
    }

    /// Wire radius.
    pub const fn radius(&self) -> f64 {
        self.config.radius
    }

    /// Set the radius.
    pub fn set_radius(&mut self, radius: f64) {
        self.config.radius = radius;
        self.apply_to_native(WireProperty::Radius(radius));
    }

    /// Wire diameter.
    pub fn diameter(&self) -> f64 {
        self.config.diameter()
    }

    /// Set the radius from a diameter.
    pub fn set_diameter(&mut self, diameter: f64) {
        self.set_radius(0.5 * diameter);
    }

    /// Lumped nodes per unit length.
    pub const fn resolution_per_unit_length(&self) -> f64 {
        self.config.resolution_per_unit_length
    }

    /// Set the resolution.
    pub fn set_resolution_per_unit_length(&mut self, resolution: f64) {
        self.config.resolution_per_unit_length = resolution;
        self.apply_to_native(WireProperty::ResolutionPerUnitLength(resolution));
    }

    /// Create the native wire.
    ///
    /// An invalid route is logged together with every invalid node. Calling
    /// this on an initialized wire does nothing.
    pub fn initialize(&mut self) -> Result<()> {
        if self.native.is_some() {
            return Ok(());
        }

        match self.create_native() {
            Ok(native) => {
                self.native = Some(native);
                debug!("Wire initialized from {} route nodes", self.route.num_nodes());
                Ok(())
            }
            Err(err) => {
                error!("Wire initialization failed: {err}");
                Err(err)
            }
        }
    }

    /// Remove the native wire from the engine.
    pub fn destroy(&mut self) {
        if let Some(native) = self.native.take() {
            self.engine.remove(native);
        }
    }

    fn create_native(&mut self) -> Result<E::Wire> {
        let issues = self.config.validate();
        if !issues.is_empty() {
            return Err(CableError::invalid_config(&issues));
        }

        let validated = self.route.validated();
        if let Some(route_error) = validated.error.as_deref() {
            error!("{route_error}");
            for (index, node) in validated.invalid_nodes() {
                if let Some(node_error) = &node.error {
                    error!("[{index}]: {node_error}");
                }
            }
            return Err(CableError::InvalidRoute(route_error.to_string()));
        }

        let mut native = self
            .engine
            .create_wire(self.config.radius, self.config.resolution_per_unit_length);

        for (index, node) in self.route.iter().enumerate() {
            for native_node in native_nodes(index, node) {
                if !self.engine.add_node(&mut native, native_node) {
                    self.engine.remove(native);
                    return Err(CableError::node_rejected(index, node.node_type().to_string()));
                }
            }
        }

        if !self.engine.initialize(&mut native) {
            self.engine.remove(native);
            return Err(CableError::InitializationFailed);
        }

        Ok(native)
    }
}

/// Native nodes of the route node at `index`, in the order they are added.
fn native_nodes(index: usize, node: &WireRouteNode) -> Vec<NativeWireNode> {
    let route_node = NativeWireNode::from(node);
    if node.node_type() != WireNodeType::Connecting {
        return vec![route_node];
    }

    let center_of_mass = NativeWireNode::center_of_mass(node);
    if index == 0 {
        vec![center_of_mass, route_node]
    } else {
        vec![route_node, center_of_mass]
    }
}

impl<E: WireEngine> NativeBinding for Wire<E> {
    type Property = WireProperty;

    fn has_native_binding(&self) -> bool {
        self.native.is_some()
    }

    fn apply_to_native(&mut self, property: WireProperty) -> bool {
        let Some(native) = self.native.as_mut() else {
            return false;
        };
        self.engine.set_property(native, property);
        true
    }
}

impl<E: WireEngine> std::fmt::Debug for Wire<E> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Wire")
            .field("config", &self.config)
            .field("num_nodes", &self.route.num_nodes())
            .field("initialized", &self.native.is_some())
            .finish_non_exhaustive()
    }
}
