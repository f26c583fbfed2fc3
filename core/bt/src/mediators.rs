//! The set of mediators reachable from this machine.
//!
//! Mediators listen on consecutive ports starting at `min_http_port`; the
//! one on port `min + k` gets the k-th lowercase letter as its prefix.
//! Reconciliation happens per prefix, since tab ids are only unique within
//! one browser.

use std::collections::BTreeMap;
use std::net::{SocketAddr, TcpStream, ToSocketAddrs};
use std::thread;
use std::time::Duration;

use brotab_core::{infer_all, parse_tab_lines, ClientConfig, Reconciliation, ReconcileError};
use brotab_core::{TabId, UpdateCommand};
use brotab_protocol::TabUpdate;
use tracing::{info, warn};

use crate::mediator_client::{ClientError, MediatorClient};

const PREFIXES: &str = "abcdefghijklmnopqrstuvwxyz";

/// Outcome of sending commands to several mediators. A failing mediator
/// never stops the others.
#[derive(Debug, Default)]
pub struct DispatchReport {
    pub succeeded: Vec<String>,
    pub failed: Vec<(String, ClientError)>,
}

impl DispatchReport {
    fn record(&mut self, prefix: &str, result: Result<(), ClientError>) {
        match result {
            Ok(()) => self.succeeded.push(prefix.to_string()),
            Err(err) => {
                warn!(prefix = %prefix, error = %err, "Mediator failed to apply commands");
                self.failed.push((prefix.to_string(), err));
            }
        }
    }

    pub fn is_success(&self) -> bool {
        self.failed.is_empty()
    }
}

/// Commands inferred for one mediator.
#[derive(Debug)]
pub struct MediatorPlan<'a> {
    pub client: &'a MediatorClient,
    pub plan: Reconciliation,
}

#[derive(Debug, Default)]
pub struct Mediators {
    clients: Vec<MediatorClient>,
}

impl Mediators {
    pub fn new(clients: Vec<MediatorClient>) -> Self {
        Self { clients }
    }

    /// Probes every configured port and connects to those accepting TCP.
    pub fn discover(config: &ClientConfig) -> Result<Self, ClientError> {
        let mut clients = Vec::new();
        for (letter, port) in PREFIXES.chars().zip(config.mediator_ports()) {
            if !port_accepting(&config.http_iface, port, config.probe_timeout) {
                continue;
            }
            let client = MediatorClient::connect(
                letter.to_string(),
                &config.http_iface,
                port,
                config.http_timeout,
            )?;
            clients.push(client);
        }
        info!(clients = ?clients, "Discovered mediators");
        Ok(Self { clients })
    }

    pub fn clients(&self) -> &[MediatorClient] {
        &self.clients
    }

    pub fn is_empty(&self) -> bool {
        self.clients.is_empty()
    }

    pub fn ready(&self) -> impl Iterator<Item = &MediatorClient> {
        self.clients.iter().filter(|client| client.is_ready())
    }

    /// Accepts `a` or `a.`.
    pub fn get_by_prefix(&self, prefix: &str) -> Option<&MediatorClient> {
        let prefix = prefix.strip_suffix('.').unwrap_or(prefix);
        self.clients.iter().find(|client| client.prefix() == prefix)
    }

    /// Lists every ready mediator concurrently. Results keep mediator order;
    /// a mediator that fails contributes no tabs.
    pub fn list_tabs(&self, limit: usize) -> Vec<String> {
        thread::scope(|scope| {
            let handles: Vec<_> = self
                .ready()
                .map(|client| scope.spawn(move || (client, client.list_tabs(limit))))
                .collect();

            handles
                .into_iter()
                .filter_map(|handle| handle.join().ok())
                .flat_map(|(client, result)| match result {
                    Ok(tabs) => tabs,
                    Err(err) => {
                        warn!(client = %client.address(), error = %err, "Cannot list tabs");
                        Vec::new()
                    }
                })
                .collect()
        })
    }

    /// Infers commands for every mediator before anything is sent.
    ///
    /// Any inference error aborts the whole edit. Mediators with nothing to
    /// do are left out.
    pub fn plan<S: AsRef<str>>(
        &self,
        before: &[S],
        after: &[S],
    ) -> Result<Vec<MediatorPlan<'_>>, ReconcileError> {
        let orphans = after
            .iter()
            .map(AsRef::as_ref)
            .filter(|line| !line.trim().is_empty())
            .filter(|line| !self.clients.iter().any(|client| client.prefix_match(line)))
            .count();
        if orphans > 0 {
            warn!(lines = orphans, "Ignoring edited lines that match no mediator");
        }

        let mut plans = Vec::new();
        for client in &self.clients {
            let tabs_before = parse_tab_lines(&client.filter_tabs(before))?;
            let tabs_after = parse_tab_lines(&client.filter_tabs(after))?;
            let plan = infer_all(&tabs_before, &tabs_after)?;
            info!(
                prefix = %client.prefix(),
                deletes = plan.deletes.len(),
                moves = plan.moves.len(),
                updates = plan.updates.len(),
                "Reconciled tabs"
            );
            if !plan.is_empty() {
                plans.push(MediatorPlan { client, plan });
            }
        }
        Ok(plans)
    }

    /// Sends each plan's deletes, then moves, then updates. A mediator stops
    /// at its first failing request.
    pub fn dispatch(&self, plans: &[MediatorPlan<'_>]) -> DispatchReport {
        let mut report = DispatchReport::default();
        for MediatorPlan { client, plan } in plans {
            report.record(client.prefix(), send_plan(client, plan));
        }
        report
    }

    /// Closes tabs by composite id, grouped by owning mediator.
    pub fn close_tabs(&self, ids: &[TabId]) -> DispatchReport {
        let mut report = DispatchReport::default();
        for (prefix, tab_ids) in group_by_prefix(ids.iter().map(|id| (id.prefix.as_str(), id.tab_id))) {
            match self.get_by_prefix(prefix) {
                Some(client) => report.record(prefix, client.close_tabs(&tab_ids)),
                None => warn!(prefix = %prefix, "No mediator for tabs to close"),
            }
        }
        report
    }

    /// Sends updates issued directly by the user. Returns the ids the
    /// mediators reported as updated.
    pub fn update_tabs(&self, updates: &[UpdateCommand]) -> (Vec<String>, DispatchReport) {
        let mut report = DispatchReport::default();
        let mut updated = Vec::new();
        let grouped = group_by_prefix(
            updates
                .iter()
                .map(|update| (update.tab_id.prefix.as_str(), update.to_wire())),
        );
        for (prefix, wire) in grouped {
            let Some(client) = self.get_by_prefix(prefix) else {
                warn!(prefix = %prefix, "No mediator for tabs to update");
                continue;
            };
            let result = client.update_tabs(&wire).map(|ids| updated.extend(ids));
            report.record(prefix, result);
        }
        (updated, report)
    }

    /// Active tab ids from every ready mediator.
    pub fn get_active_tabs(&self) -> Vec<String> {
        self.ready()
            .flat_map(|client| match client.get_active_tabs() {
                Ok(ids) => ids,
                Err(err) => {
                    warn!(client = %client.address(), error = %err, "Cannot get active tabs");
                    Vec::new()
                }
            })
            .collect()
    }
}

fn send_plan(client: &MediatorClient, plan: &Reconciliation) -> Result<(), ClientError> {
    if !plan.deletes.is_empty() {
        let ids: Vec<u64> = plan.deletes.iter().map(|delete| delete.id().tab_id).collect();
        client.close_tabs(&ids)?;
    }
    if !plan.moves.is_empty() {
        let triplets: Vec<_> = plan.moves.iter().map(|command| command.to_wire()).collect();
        client.move_tabs(&triplets)?;
    }
    if !plan.updates.is_empty() {
        let updates: Vec<TabUpdate> = plan.updates.iter().map(UpdateCommand::to_wire).collect();
        client.update_tabs(&updates)?;
    }
    Ok(())
}

fn group_by_prefix<'a, T>(items: impl Iterator<Item = (&'a str, T)>) -> BTreeMap<&'a str, Vec<T>> {
    let mut grouped: BTreeMap<&str, Vec<T>> = BTreeMap::new();
    for (prefix, item) in items {
        grouped.entry(prefix).or_default().push(item);
    }
    grouped
}

fn port_accepting(host: &str, port: u16, timeout: Duration) -> bool {
    let addresses: Vec<SocketAddr> = match (host, port).to_socket_addrs() {
        Ok(addresses) => addresses.collect(),
        Err(err) => {
            warn!(host = %host, error = %err, "Cannot resolve mediator host");
            return false;
        }
    };
    addresses
        .iter()
        .any(|address| TcpStream::connect_timeout(address, timeout).is_ok())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::test_support::{mediator_with_tabs, FakeMediator};
    use std::collections::HashMap;

    const TIMEOUT: Duration = Duration::from_secs(5);

    fn connect(prefix: &str, mediator: &FakeMediator) -> MediatorClient {
        MediatorClient::connect(prefix, "127.0.0.1", mediator.port, TIMEOUT).unwrap()
    }

    #[test]
    fn test_list_tabs_keeps_mediator_order() {
        let first = mediator_with_tabs("1.1\tone\thttps://one\n");
        let second = mediator_with_tabs("2.2\ttwo\thttps://two\n");
        let mediators = Mediators::new(vec![connect("a", &first), connect("b", &second)]);
        assert_eq!(
            mediators.list_tabs(5000),
            vec!["a.1.1\tone\thttps://one", "b.2.2\ttwo\thttps://two"]
        );
    }

    #[test]
    fn test_failing_mediator_lists_nothing() {
        let healthy = mediator_with_tabs("1.1\tone\thttps://one\n");
        let broken = FakeMediator::start(|path| match path {
            "/list_tabs" => (500, String::new()),
            _ => (200, "7".to_string()),
        });
        let mediators = Mediators::new(vec![connect("a", &broken), connect("b", &healthy)]);
        assert_eq!(mediators.list_tabs(5000), vec!["b.1.1\tone\thttps://one"]);
    }

    fn config_for_ports(min: u16, max: u16) -> ClientConfig {
        let vars: HashMap<String, String> = [
            ("MIN_HTTP_PORT".to_string(), min.to_string()),
            ("MAX_HTTP_PORT".to_string(), max.to_string()),
        ]
        .into_iter()
        .collect();
        ClientConfig::from_vars(&vars).unwrap()
    }

    #[test]
    fn test_discover_connects_to_listening_port() {
        let mediator = mediator_with_tabs("");
        let config = config_for_ports(mediator.port, mediator.port + 1);
        let mediators = Mediators::discover(&config).unwrap();

        assert_eq!(mediators.clients().len(), 1);
        assert_eq!(mediators.clients()[0].prefix(), "a");
        assert_eq!(mediators.ready().count(), 1);
    }

    #[test]
    fn test_discover_skips_closed_port() {
        let closed = std::net::TcpListener::bind("127.0.0.1:0").unwrap();
        let port = closed.local_addr().unwrap().port();
        drop(closed);

        let mediators = Mediators::discover(&config_for_ports(port, port + 1)).unwrap();
        assert!(mediators.is_empty());
    }

    #[test]
    fn test_plan_aborts_on_lookup_failure_before_dispatch() {
        let first = mediator_with_tabs("");
        let second = mediator_with_tabs("");
        let mediators = Mediators::new(vec![connect("a", &first), connect("b", &second)]);

        let before = ["a.0.1\tone\turl", "b.0.2\ttwo\turl"];
        let after = ["a.0.1\tone\turl", "b.0.2\trenamed\turl"];
        assert!(mediators.plan(&before, &after).is_err());
        assert!(!first.paths().iter().any(|p| p.starts_with("/close_tabs")));
    }

    #[test]
    fn test_dispatch_sends_each_mediator_its_commands() {
        let first = mediator_with_tabs("");
        let second = mediator_with_tabs("");
        let mediators = Mediators::new(vec![connect("a", &first), connect("b", &second)]);

        let before = [
            "a.0.1\tone\turl",
            "a.0.2\ttwo\turl",
            "b.0.5\tfive\turl",
            "b.0.6\tsix\turl",
        ];
        let after = ["a.0.2\ttwo\turl", "b.0.6\tsix\turl", "b.0.5\tfive\turl"];
        let plans = mediators.plan(&before, &after).unwrap();
        assert_eq!(plans.len(), 2);

        let report = mediators.dispatch(&plans);
        assert!(report.is_success());
        assert!(first.paths().contains(&"/close_tabs/1".to_string()));
        assert!(second.paths().contains(&"/move_tabs/6+0+0".to_string()));
    }

    #[test]
    fn test_dispatch_isolates_failures() {
        let broken = FakeMediator::start(|path| match path {
            "/get_pid" => (200, "1".to_string()),
            p if p.starts_with("/close_tabs") => (500, String::new()),
            _ => (200, "OK".to_string()),
        });
        let healthy = mediator_with_tabs("");
        let mediators = Mediators::new(vec![connect("a", &broken), connect("b", &healthy)]);

        let before = ["a.0.1\tone\turl", "b.0.2\ttwo\turl"];
        let after: [&str; 0] = [];
        let plans = mediators.plan(&before, &after).unwrap();
        let report = mediators.dispatch(&plans);

        assert_eq!(report.succeeded, vec!["b"]);
        assert_eq!(report.failed.len(), 1);
        assert_eq!(report.failed[0].0, "a");
        assert!(healthy.paths().contains(&"/close_tabs/2".to_string()));
    }

    #[test]
    fn test_close_and_update_route_by_prefix() {
        let first = mediator_with_tabs("");
        let second = FakeMediator::start(|path| match path {
            "/update_tabs" => (200, "9\n".to_string()),
            _ => (200, "1".to_string()),
        });
        let mediators = Mediators::new(vec![connect("a", &first), connect("b", &second)]);

        let report = mediators.close_tabs(&[TabId::new("a", 0, 3), TabId::new("a", 1, 4)]);
        assert!(report.is_success());
        assert!(first.paths().contains(&"/close_tabs/3,4".to_string()));

        let (ids, report) =
            mediators.update_tabs(&[UpdateCommand::url(TabId::new("b", 0, 9), "https://x")]);
        assert!(report.is_success());
        assert_eq!(ids, vec!["b.9"]);
        assert!(!first.paths().contains(&"/update_tabs".to_string()));
    }

    #[test]
    fn test_get_by_prefix_accepts_trailing_dot() {
        let mediator = mediator_with_tabs("");
        let mediators = Mediators::new(vec![connect("a", &mediator)]);
        assert!(mediators.get_by_prefix("a.").is_some());
        assert!(mediators.get_by_prefix("a").is_some());
        assert!(mediators.get_by_prefix("b").is_none());
    }
}
