// Copyright 2026 Phillip Cloud
// Licensed under the Apache License, Version 2.0

use anyhow::{Context, Result, anyhow, bail};
use serde::{Deserialize, Serialize};
use std::any::Any;
use std::collections::{BTreeMap, BTreeSet};
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::{Arc, Mutex};
use std::thread;
use std::time::{Duration, SystemTime};
use strata_app::{
    ChildView, Clipboard, LoadContext, Node, Registry, SessionOptions, TableData, to_node,
};
use time::OffsetDateTime;

pub const CONTROL_PLANE_TYPE: &str = "control_plane";
pub const SERVICE_TYPE: &str = "service";
pub const CONSUMER_TYPE: &str = "consumer";
pub const ROUTE_TYPE: &str = "route";
pub const PLUGIN_TYPE: &str = "plugin";
pub const DEMO_SEED: u64 = 7;
pub const DEMO_CONTROL_PLANES: usize = 6;

// 2025-01-01T00:00:00Z
const REFERENCE_UNIX: i64 = 1_735_689_600;

const CLUSTER_TYPES: [&str; 3] = [
    "CLUSTER_TYPE_CONTROL_PLANE",
    "CLUSTER_TYPE_K8S_INGRESS_CONTROLLER",
    "CLUSTER_TYPE_SERVERLESS",
];

const ENVIRONMENTS: [&str; 4] = ["prod", "staging", "dev", "sandbox"];

const TEAMS: [&str; 6] = [
    "payments", "identity", "catalog", "search", "platform", "growth",
];

const REGIONS: [&str; 4] = ["us", "eu", "au", "me"];

const AUTH_TYPES: [&str; 2] = ["pinned_client_certs", "pki_client_certs"];

const SERVICE_NAMES: [&str; 12] = [
    "billing",
    "catalog",
    "checkout",
    "inventory",
    "ledger",
    "notifications",
    "orders",
    "payments",
    "profiles",
    "recommendations",
    "search",
    "shipping",
];

const PLUGIN_NAMES: [&str; 8] = [
    "rate-limiting",
    "key-auth",
    "cors",
    "request-transformer",
    "acl",
    "jwt",
    "prometheus",
    "proxy-cache",
];

const HTTP_METHODS: [&str; 5] = ["GET", "POST", "PUT", "PATCH", "DELETE"];
const PROTOCOLS: [&str; 2] = ["http", "https"];
const CONSUMER_PREFIXES: [&str; 6] = ["mobile", "partner", "web", "batch", "internal", "kiosk"];

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ControlPlaneConfig {
    pub control_plane_endpoint: String,
    pub telemetry_endpoint: String,
    pub auth_type: String,
    pub cloud_gateway: bool,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ControlPlane {
    pub id: String,
    pub name: String,
    pub description: String,
    pub cluster_type: String,
    pub labels: BTreeMap<String, String>,
    pub config: ControlPlaneConfig,
    pub created_at: SystemTime,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Service {
    pub id: String,
    pub name: String,
    pub host: String,
    pub port: u16,
    pub protocol: String,
    pub path: Option<String>,
    pub enabled: bool,
    pub tags: Vec<String>,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Route {
    pub id: String,
    pub name: String,
    pub paths: Vec<String>,
    pub methods: Vec<String>,
    pub strip_path: bool,
    pub service_id: String,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Plugin {
    pub id: String,
    pub name: String,
    pub enabled: bool,
    pub protocols: Vec<String>,
    pub config: BTreeMap<String, String>,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Consumer {
    pub id: String,
    pub username: String,
    pub custom_id: Option<String>,
    pub tags: Vec<String>,
}

#[derive(Debug, Clone, Default)]
pub struct GatewayDataset {
    pub control_planes: Vec<ControlPlane>,
    pub services: BTreeMap<String, Vec<Service>>,
    pub consumers: BTreeMap<String, Vec<Consumer>>,
    pub routes: BTreeMap<String, Vec<Route>>,
    pub plugins: BTreeMap<String, Vec<Plugin>>,
}

#[derive(Debug, Clone)]
struct DeterministicRng {
    state: u64,
}

impl DeterministicRng {
    fn new(seed: u64) -> Self {
        let mut state = seed ^ 0x9E37_79B9_7F4A_7C15;
        if state == 0 {
            state = 0xA409_3822_299F_31D0;
        }
        Self { state }
    }

    fn next_u64(&mut self) -> u64 {
        self.state = self
            .state
            .wrapping_mul(6_364_136_223_846_793_005)
            .wrapping_add(1_442_695_040_888_963_407);

        let mut x = self.state;
        x ^= x >> 13;
        x ^= x << 7;
        x ^= x >> 17;
        x
    }

    fn int_n(&mut self, n: usize) -> usize {
        if n <= 1 {
            return 0;
        }
        (self.next_u64() % (n as u64)) as usize
    }

    fn bool(&mut self) -> bool {
        (self.next_u64() & 1) == 1
    }
}

#[derive(Debug, Clone)]
pub struct GatewayFaker {
    rng: DeterministicRng,
    seed: u64,
}

impl GatewayFaker {
    pub fn new(seed: u64) -> Self {
        let normalized = if seed == 0 { 1 } else { seed };
        Self {
            rng: DeterministicRng::new(normalized),
            seed: normalized,
        }
    }

    pub fn seed(&self) -> u64 {
        self.seed
    }

    pub fn control_plane(&mut self) -> ControlPlane {
        let team = self.pick(&TEAMS);
        let environment = self.pick(&ENVIRONMENTS);
        let region = self.pick(&REGIONS);
        let id = self.uuid();
        let host = id[..8].to_owned();

        let mut labels = BTreeMap::new();
        labels.insert("env".to_owned(), environment.to_owned());
        labels.insert("team".to_owned(), team.to_owned());
        if self.rng.bool() {
            labels.insert("region".to_owned(), region.to_owned());
        }

        ControlPlane {
            name: format!("{team}-{environment}"),
            description: format!("{team} gateway for {environment} traffic in {region}"),
            cluster_type: self.pick(&CLUSTER_TYPES).to_owned(),
            labels,
            config: ControlPlaneConfig {
                control_plane_endpoint: format!("https://{host}.{region}.cp0.konghq.tech"),
                telemetry_endpoint: format!("https://{host}.{region}.tp0.konghq.tech"),
                auth_type: self.pick(&AUTH_TYPES).to_owned(),
                cloud_gateway: self.rng.bool(),
            },
            created_at: self.created_at(),
            id,
        }
    }

    pub fn service(&mut self) -> Service {
        let name = self.pick(&SERVICE_NAMES);
        let tag_count = self.int_range(0, 2);
        let tags = (0..tag_count)
            .map(|_| self.pick(&TEAMS).to_owned())
            .collect::<BTreeSet<_>>()
            .into_iter()
            .collect();

        Service {
            id: self.uuid(),
            name: name.to_owned(),
            host: format!("{name}.internal"),
            port: if self.rng.bool() { 80 } else { 8080 },
            protocol: self.pick(&PROTOCOLS).to_owned(),
            path: self.rng.bool().then(|| format!("/{name}")),
            enabled: self.rng.int_n(5) != 0,
            tags,
        }
    }

    pub fn route(&mut self, service: &Service) -> Route {
        let version = self.int_range(1, 3);
        let method_count = self.int_range(1, 3);
        let methods = (0..method_count)
            .map(|_| self.pick(&HTTP_METHODS).to_owned())
            .collect::<BTreeSet<_>>()
            .into_iter()
            .collect();

        Route {
            id: self.uuid(),
            name: format!("{}-v{version}", service.name),
            paths: vec![format!("/v{version}/{}", service.name)],
            methods,
            strip_path: self.rng.bool(),
            service_id: service.id.clone(),
        }
    }

    pub fn plugin(&mut self) -> Plugin {
        let name = self.pick(&PLUGIN_NAMES);
        let mut config = BTreeMap::new();
        match name {
            "rate-limiting" => {
                config.insert("minute".to_owned(), self.int_range(10, 600).to_string());
                config.insert("policy".to_owned(), "local".to_owned());
            }
            "cors" => {
                config.insert("origins".to_owned(), "*".to_owned());
            }
            "proxy-cache" => {
                config.insert("cache_ttl".to_owned(), self.int_range(30, 300).to_string());
            }
            _ => {}
        }

        Plugin {
            id: self.uuid(),
            name: name.to_owned(),
            enabled: self.rng.int_n(4) != 0,
            protocols: PROTOCOLS.iter().map(|protocol| (*protocol).to_owned()).collect(),
            config,
        }
    }

    pub fn consumer(&mut self) -> Consumer {
        let prefix = self.pick(&CONSUMER_PREFIXES);
        let number = self.int_range(1, 999);
        Consumer {
            id: self.uuid(),
            username: format!("{prefix}-client-{number:03}"),
            custom_id: self.rng.bool().then(|| format!("ext-{number:05}")),
            tags: vec![prefix.to_owned()],
        }
    }

    pub fn dataset(&mut self, control_planes: usize) -> GatewayDataset {
        let mut dataset = GatewayDataset::default();
        for index in 0..control_planes {
            let control_plane = self.control_plane();
            let floor = usize::from(index == 0);

            let service_count = self.int_range(floor, 4);
            let mut services = Vec::with_capacity(service_count);
            for _ in 0..service_count {
                let service = self.service();
                let route_count = self.int_range(1, 3);
                let routes = (0..route_count).map(|_| self.route(&service)).collect();
                let plugin_count = self.int_range(0, 2);
                let plugins = (0..plugin_count).map(|_| self.plugin()).collect();
                dataset.routes.insert(service.id.clone(), routes);
                dataset.plugins.insert(service.id.clone(), plugins);
                services.push(service);
            }

            let consumer_count = self.int_range(floor, 3);
            let consumers = (0..consumer_count).map(|_| self.consumer()).collect();

            dataset.services.insert(control_plane.id.clone(), services);
            dataset.consumers.insert(control_plane.id.clone(), consumers);
            dataset.control_planes.push(control_plane);
        }
        dataset
    }

    fn pick<'a>(&mut self, items: &'a [&'a str]) -> &'a str {
        items[self.rng.int_n(items.len())]
    }

    fn int_range(&mut self, min: usize, max: usize) -> usize {
        if max <= min {
            return min;
        }
        min + self.rng.int_n(max - min + 1)
    }

    fn uuid(&mut self) -> String {
        let high = self.rng.next_u64();
        let low = self.rng.next_u64();
        format!(
            "{:08x}-{:04x}-4{:03x}-{:04x}-{:012x}",
            high >> 32,
            (high >> 16) & 0xffff,
            high & 0x0fff,
            ((low >> 48) & 0x3fff) | 0x8000,
            low & 0xffff_ffff_ffff
        )
    }

    fn created_at(&mut self) -> SystemTime {
        let age = self.rng.next_u64() % (730 * 86_400);
        let seconds = REFERENCE_UNIX - age as i64;
        (OffsetDateTime::UNIX_EPOCH + time::Duration::seconds(seconds)).into()
    }
}

/// In-process stand-in for a gateway admin API. Loaders reach it through
/// [`LoadContext::capability`].
#[derive(Debug)]
pub struct GatewayClient {
    dataset: Arc<GatewayDataset>,
    latency: Duration,
    denied: BTreeSet<String>,
    calls: AtomicUsize,
}

impl GatewayClient {
    pub fn new(dataset: Arc<GatewayDataset>) -> Self {
        Self {
            dataset,
            latency: Duration::ZERO,
            denied: BTreeSet::new(),
            calls: AtomicUsize::new(0),
        }
    }

    pub fn with_latency(mut self, latency: Duration) -> Self {
        self.latency = latency;
        self
    }

    pub fn deny(mut self, resource: &str) -> Self {
        self.denied.insert(resource.to_owned());
        self
    }

    pub fn calls(&self) -> usize {
        self.calls.load(Ordering::SeqCst)
    }

    pub fn dataset(&self) -> &GatewayDataset {
        &self.dataset
    }

    pub fn list_services(&self, control_plane_id: &str) -> Result<Vec<Service>> {
        self.request("services")?;
        self.dataset
            .services
            .get(control_plane_id)
            .cloned()
            .with_context(|| format!("control plane {control_plane_id} not found"))
    }

    pub fn list_consumers(&self, control_plane_id: &str) -> Result<Vec<Consumer>> {
        self.request("consumers")?;
        self.dataset
            .consumers
            .get(control_plane_id)
            .cloned()
            .with_context(|| format!("control plane {control_plane_id} not found"))
    }

    pub fn list_routes(&self, service_id: &str) -> Result<Vec<Route>> {
        self.request("routes")?;
        self.dataset
            .routes
            .get(service_id)
            .cloned()
            .with_context(|| format!("service {service_id} not found"))
    }

    pub fn list_plugins(&self, service_id: &str) -> Result<Vec<Plugin>> {
        self.request("plugins")?;
        self.dataset
            .plugins
            .get(service_id)
            .cloned()
            .with_context(|| format!("service {service_id} not found"))
    }

    fn request(&self, resource: &str) -> Result<()> {
        self.calls.fetch_add(1, Ordering::SeqCst);
        if !self.latency.is_zero() {
            thread::sleep(self.latency);
        }
        if self.denied.contains(resource) {
            bail!("403 Forbidden: not allowed to list {resource}");
        }
        Ok(())
    }
}

fn gateway_client(context: &LoadContext) -> Result<&GatewayClient> {
    context
        .capability::<GatewayClient>()
        .context("gateway client is not configured")
}

fn parent_id(parent: Option<&Node>) -> Result<String> {
    parent
        .and_then(|parent| parent.field("id"))
        .and_then(Node::as_str)
        .map(str::to_owned)
        .context("parent record has no id")
}

pub fn demo_registry() -> Registry {
    let mut registry = Registry::new();
    registry.register(CONTROL_PLANE_TYPE, "services", |context, parent| {
        let services = gateway_client(context)?.list_services(&parent_id(parent)?)?;
        ChildView::from_records("Services", SERVICE_TYPE, &services)
    });
    registry.register(CONTROL_PLANE_TYPE, "consumers", |context, parent| {
        let consumers = gateway_client(context)?.list_consumers(&parent_id(parent)?)?;
        ChildView::from_records("Consumers", CONSUMER_TYPE, &consumers)
    });
    registry.register(SERVICE_TYPE, "routes", |context, parent| {
        let routes = gateway_client(context)?.list_routes(&parent_id(parent)?)?;
        ChildView::from_records("Routes", ROUTE_TYPE, &routes)
    });
    registry.register(SERVICE_TYPE, "plugins", |context, parent| {
        let plugins = gateway_client(context)?.list_plugins(&parent_id(parent)?)?;
        ChildView::from_records("Plugins", PLUGIN_TYPE, &plugins)
    });
    registry
}

#[derive(Debug)]
pub struct DemoSession {
    pub table: TableData,
    pub options: SessionOptions,
    pub registry: Arc<Registry>,
    pub client: Arc<GatewayClient>,
}

pub fn demo_session(seed: u64, latency: Duration) -> Result<DemoSession> {
    let dataset = GatewayFaker::new(seed).dataset(DEMO_CONTROL_PLANES);
    let table = TableData::from_records(&dataset.control_planes)
        .context("project control planes")?;
    let nodes = dataset
        .control_planes
        .iter()
        .map(to_node)
        .collect::<Result<Vec<_>, _>>()
        .context("capture control planes")?;
    let nodes = Arc::new(nodes);
    let descriptions: Vec<String> = dataset
        .control_planes
        .iter()
        .map(|control_plane| control_plane.description.clone())
        .collect();

    let client = Arc::new(GatewayClient::new(Arc::new(dataset)).with_latency(latency));
    let capabilities: Arc<dyn Any + Send + Sync> = client.clone();

    let render = Arc::clone(&nodes);
    let options = SessionOptions::new()
        .with_title("Control Planes")
        .with_detail_renderer(move |index| {
            render
                .get(index)
                .map(Node::record_detail)
                .unwrap_or_default()
        })
        .with_preview_renderer(move |index| descriptions.get(index).cloned().unwrap_or_default())
        .with_detail_context(CONTROL_PLANE_TYPE, move |index| nodes.get(index).cloned())
        .with_capabilities(capabilities);

    Ok(DemoSession {
        table,
        options,
        registry: Arc::new(demo_registry()),
        client,
    })
}

#[derive(Debug, Clone, Default)]
pub struct FakeClipboard {
    copied: Arc<Mutex<Vec<String>>>,
    failure: Option<String>,
}

impl FakeClipboard {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn failing(message: impl Into<String>) -> Self {
        Self {
            failure: Some(message.into()),
            ..Self::default()
        }
    }

    pub fn copied(&self) -> Vec<String> {
        self.copied
            .lock()
            .map(|copied| copied.clone())
            .unwrap_or_default()
    }
}

impl Clipboard for FakeClipboard {
    fn copy(&mut self, text: &str) -> Result<()> {
        if let Some(message) = &self.failure {
            bail!("{message}");
        }
        self.copied
            .lock()
            .map_err(|_| anyhow!("clipboard buffer poisoned"))?
            .push(text.to_owned());
        Ok(())
    }
}

#[derive(Debug, Clone, Default)]
pub struct LoadCounter {
    calls: Arc<AtomicUsize>,
}

impl LoadCounter {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn calls(&self) -> usize {
        self.calls.load(Ordering::SeqCst)
    }

    pub fn child_loader(
        &self,
        view: ChildView,
    ) -> impl Fn(&LoadContext, Option<&Node>) -> Result<ChildView> + Send + Sync + 'static {
        let calls = Arc::clone(&self.calls);
        move |_, _| {
            calls.fetch_add(1, Ordering::SeqCst);
            Ok(view.clone())
        }
    }

    pub fn row_loader(
        &self,
        view: ChildView,
    ) -> impl Fn(&LoadContext, usize) -> Result<ChildView> + Send + Sync + 'static {
        let calls = Arc::clone(&self.calls);
        move |_, _| {
            calls.fetch_add(1, Ordering::SeqCst);
            Ok(view.clone())
        }
    }

    pub fn failing_loader(
        &self,
        message: &str,
    ) -> impl Fn(&LoadContext, Option<&Node>) -> Result<ChildView> + Send + Sync + 'static {
        let calls = Arc::clone(&self.calls);
        let message = message.to_owned();
        move |_, _| {
            calls.fetch_add(1, Ordering::SeqCst);
            Err(anyhow!("{message}"))
        }
    }
}

#[cfg(test)]
mod tests {
    use super::{
        CONTROL_PLANE_TYPE, DEMO_SEED, FakeClipboard, GatewayClient, GatewayFaker, LoadCounter,
        SERVICE_TYPE, demo_registry, demo_session,
    };
    use std::any::Any;
    use std::sync::Arc;
    use std::time::Duration;
    use strata_app::format::is_uuid_like;
    use strata_app::{ChildView, Clipboard, LoadContext, to_node};

    #[test]
    fn new_deterministic_seed() {
        let left = GatewayFaker::new(42).dataset(3);
        let right = GatewayFaker::new(42).dataset(3);
        assert_eq!(left.control_planes, right.control_planes);
        assert_eq!(left.services, right.services);
        assert_eq!(GatewayFaker::new(0).seed(), 1);
    }

    #[test]
    fn control_plane() {
        let mut faker = GatewayFaker::new(1);
        let control_plane = faker.control_plane();

        assert!(is_uuid_like(&control_plane.id));
        assert!(control_plane.name.contains('-'));
        assert!(control_plane.labels.contains_key("env"));
        assert!(
            control_plane
                .config
                .control_plane_endpoint
                .starts_with("https://")
        );
    }

    #[test]
    fn dataset_links_children_to_parents() {
        let dataset = GatewayFaker::new(DEMO_SEED).dataset(4);
        assert_eq!(dataset.control_planes.len(), 4);

        let first = &dataset.control_planes[0];
        assert!(!dataset.services[&first.id].is_empty());
        assert!(!dataset.consumers[&first.id].is_empty());

        for services in dataset.services.values() {
            for service in services {
                let routes = &dataset.routes[&service.id];
                assert!(!routes.is_empty());
                assert!(routes.iter().all(|route| route.service_id == service.id));
                assert!(dataset.plugins.contains_key(&service.id));
            }
        }
    }

    fn client_context(client: GatewayClient) -> (Arc<GatewayClient>, LoadContext) {
        let client = Arc::new(client);
        let capabilities: Arc<dyn Any + Send + Sync> = client.clone();
        (client, LoadContext::new(Some(capabilities)))
    }

    #[test]
    fn registry_loaders_use_the_client_capability() -> anyhow::Result<()> {
        let dataset = Arc::new(GatewayFaker::new(DEMO_SEED).dataset(2));
        let (client, context) = client_context(GatewayClient::new(Arc::clone(&dataset)));
        let registry = demo_registry();
        assert_eq!(registry.len(), 4);

        let control_plane = to_node(&dataset.control_planes[0])?;
        let Some(loader) = registry.lookup(CONTROL_PLANE_TYPE, "services") else {
            panic!("services loader should be registered");
        };
        let view = loader(&context, Some(&control_plane))?;
        assert_eq!(view.parent_type, SERVICE_TYPE);
        assert_eq!(view.rows.len(), dataset.services[&dataset.control_planes[0].id].len());
        assert_eq!(view.headers[0], "ID");
        assert_eq!(client.calls(), 1);

        let Some(loader) = registry.lookup(SERVICE_TYPE, "routes") else {
            panic!("routes loader should be registered");
        };
        let service = view.context(0);
        let routes = loader(&context, service.as_ref())?;
        assert!(!routes.rows.is_empty());
        assert_eq!(client.calls(), 2);
        Ok(())
    }

    #[test]
    fn loaders_report_missing_capability_and_denied_access() {
        let dataset = Arc::new(GatewayFaker::new(DEMO_SEED).dataset(1));
        let registry = demo_registry();
        let Some(loader) = registry.lookup(CONTROL_PLANE_TYPE, "consumers") else {
            panic!("consumers loader should be registered");
        };
        let parent = to_node(&dataset.control_planes[0]).ok();

        let error = loader(&LoadContext::default(), parent.as_ref())
            .map(|_| ())
            .map_err(|err| err.to_string());
        assert_eq!(error, Err("gateway client is not configured".to_owned()));

        let (client, context) =
            client_context(GatewayClient::new(Arc::clone(&dataset)).deny("consumers"));
        let error = loader(&context, parent.as_ref())
            .map(|_| ())
            .map_err(|err| err.to_string());
        assert_eq!(
            error,
            Err("403 Forbidden: not allowed to list consumers".to_owned())
        );
        assert_eq!(client.calls(), 1);

        let error = loader(&context, None).map(|_| ()).map_err(|err| err.to_string());
        assert_eq!(error, Err("parent record has no id".to_owned()));
    }

    #[test]
    fn demo_session_projects_control_planes() -> anyhow::Result<()> {
        let demo = demo_session(DEMO_SEED, Duration::ZERO)?;
        assert_eq!(
            demo.table.headers,
            vec![
                "ID",
                "NAME",
                "DESCRIPTION",
                "CLUSTER TYPE",
                "LABELS",
                "CONFIG",
                "CREATED AT"
            ]
        );
        assert_eq!(demo.table.row_count(), super::DEMO_CONTROL_PLANES);
        assert_eq!(demo.options.parent_type, CONTROL_PLANE_TYPE);

        let Some(renderer) = demo.options.detail_renderer.as_ref() else {
            panic!("demo session should render details");
        };
        let detail = renderer(0);
        assert!(detail.starts_with("id: "));
        assert!(detail.contains("\ncreated_at: 20"));
        assert_eq!(demo.client.calls(), 0);
        Ok(())
    }

    #[test]
    fn fake_clipboard_records_or_fails() {
        let mut clipboard = FakeClipboard::new();
        let observer = clipboard.clone();
        assert!(clipboard.copy("billing").is_ok());
        assert_eq!(observer.copied(), vec!["billing"]);

        let mut failing = FakeClipboard::failing("no terminal");
        let error = failing.copy("x").map_err(|err| err.to_string());
        assert_eq!(error, Err("no terminal".to_owned()));
        assert!(failing.copied().is_empty());
    }

    #[test]
    fn load_counter_counts_every_loader() {
        let counter = LoadCounter::new();
        let view = ChildView::collection(vec!["NAME".to_owned()], Vec::new(), None, "Empty");
        let child = counter.child_loader(view.clone());
        let row = counter.row_loader(view);
        let failing = counter.failing_loader("boom");
        let context = LoadContext::default();

        assert!(child(&context, None).is_ok());
        assert!(row(&context, 3).is_ok());
        assert!(failing(&context, None).is_err());
        assert_eq!(counter.calls(), 3);
    }
}
