//! Page-level controller for the organization chart.

use super::fetch::{FetchGuard, FetchTicket};
use super::{FetchError, PersistError, SessionError};
use crate::backend::{BackendError, OrgBackend};
use crate::chart::{ChartAdapter, ChartRenderer, NodeSelected};
use crate::config::OrgChartConfig;
use crate::hierarchy::integrity::check_integrity;
use crate::hierarchy::query::count_roots;
use crate::hierarchy::transform::{build_nodes, TransformOptions};
use crate::hierarchy::validate::{candidate_parents, validate_reparent, ValidationError};
use crate::model::node::{NodeId, OrgNode};
use crate::model::record::{MemberRecord, RootRecord, UpdateOutcome};
use crate::model::snapshot::Hierarchy;
use log::{debug, error, info, warn};
use std::error::Error;
use std::sync::Arc;

/// Raw data returned by one fetch round-trip.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct FetchPayload {
    pub root: Option<RootRecord>,
    pub members: Vec<MemberRecord>,
}

/// Result of completing a fetch.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FetchOutcome {
    /// Result became the committed snapshot.
    Applied { version: u64 },
    /// A newer fetch was issued meanwhile; result discarded.
    Stale,
}

/// Chart data availability.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum LoadState {
    NotLoaded,
    Loading,
    Ready,
    /// Latest fetch failed; no chart is shown.
    Failed,
}

/// Open edit dialog contents.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct EditDraft {
    pub node_id: NodeId,
    pub original_parent_id: Option<NodeId>,
    pub proposed_parent_id: Option<NodeId>,
}

/// Handle for the one in-flight parent update.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PersistTicket {
    seq: u64,
    node_id: NodeId,
    parent_id: Option<NodeId>,
}

impl PersistTicket {
    pub fn node_id(&self) -> &str {
        &self.node_id
    }

    pub fn parent_id(&self) -> Option<&str> {
        self.parent_id.as_deref()
    }
}

/// Edit dialog state machine.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum EditState {
    Idle,
    Editing(EditDraft),
    /// Input disabled until the persist completes.
    Saving {
        draft: EditDraft,
        ticket: PersistTicket,
    },
}

impl EditState {
    pub fn draft(&self) -> Option<&EditDraft> {
        match self {
            Self::Idle => None,
            Self::Editing(draft) | Self::Saving { draft, .. } => Some(draft),
        }
    }
}

/// Owns the committed snapshot, the chart and the edit dialog of one page.
pub struct OrgChartSession<R: ChartRenderer> {
    options: TransformOptions,
    fetches: FetchGuard,
    load_state: LoadState,
    snapshot: Option<Arc<Hierarchy>>,
    next_version: u64,
    chart: ChartAdapter<R>,
    edit: EditState,
    persist_seq: u64,
    notice: Option<String>,
}

impl<R: ChartRenderer> OrgChartSession<R> {
    pub fn new(renderer: R, options: TransformOptions) -> Self {
        Self {
            options,
            fetches: FetchGuard::new(),
            load_state: LoadState::NotLoaded,
            snapshot: None,
            next_version: 1,
            chart: ChartAdapter::new(renderer),
            edit: EditState::Idle,
            persist_seq: 0,
            notice: None,
        }
    }

    pub fn from_config(renderer: R, config: &OrgChartConfig) -> Self {
        Self::new(renderer, config.transform_options())
    }

    pub fn load_state(&self) -> LoadState {
        self.load_state
    }

    /// Committed snapshot shared with readers.
    pub fn snapshot(&self) -> Option<&Arc<Hierarchy>> {
        self.snapshot.as_ref()
    }

    pub fn edit_state(&self) -> &EditState {
        &self.edit
    }

    pub fn is_saving(&self) -> bool {
        matches!(self.edit, EditState::Saving { .. })
    }

    /// Last user-facing message from a failed transition.
    pub fn notice(&self) -> Option<&str> {
        self.notice.as_deref()
    }

    pub fn chart(&self) -> &ChartAdapter<R> {
        &self.chart
    }

    /// Node shown in the edit dialog header.
    pub fn editing_node(&self) -> Option<&OrgNode> {
        let draft = self.edit.draft()?;
        self.snapshot.as_ref()?.get(&draft.node_id)
    }

    /// Parent choices for the open dialog, in node-list order.
    pub fn candidate_parents(&self) -> Vec<&OrgNode> {
        match (self.edit.draft(), self.snapshot.as_ref()) {
            (Some(draft), Some(snapshot)) => candidate_parents(snapshot.nodes(), &draft.node_id),
            _ => Vec::new(),
        }
    }

    /// Starts a fetch; every earlier ticket becomes stale.
    pub fn begin_fetch(&mut self) -> FetchTicket {
        let ticket = self.fetches.issue();
        self.load_state = LoadState::Loading;
        info!(
            "event=fetch module=session status=start seq={}",
            ticket.seq()
        );
        ticket
    }

    /// Completes the fetch identified by `ticket`.
    ///
    /// # Errors
    /// - `FetchError` when the latest fetch failed; the chart is cleared.
    ///   Failures of stale fetches are dropped and reported as `Stale`.
    pub fn finish_fetch(
        &mut self,
        ticket: FetchTicket,
        result: Result<FetchPayload, BackendError>,
    ) -> Result<FetchOutcome, FetchError> {
        if !self.fetches.is_current(ticket) {
            info!(
                "event=fetch module=session status=stale seq={} latest_seq={}",
                ticket.seq(),
                self.fetches.latest()
            );
            return Ok(FetchOutcome::Stale);
        }

        let nodes = match result
            .map_err(FetchError::Backend)
            .and_then(|payload| self.build_committed_nodes(&payload))
        {
            Ok(nodes) => nodes,
            Err(err) => {
                error!(
                    "event=fetch module=session status=error seq={} error_code={} error={}",
                    ticket.seq(),
                    err.code(),
                    err.source().map_or_else(String::new, |inner| inner.to_string())
                );
                self.snapshot = None;
                self.chart.clear();
                if !self.is_saving() {
                    self.edit = EditState::Idle;
                }
                self.load_state = LoadState::Failed;
                return Err(err);
            }
        };

        let version = self.next_version;
        self.next_version += 1;
        let snapshot = Arc::new(Hierarchy::new(version, nodes));
        self.chart.sync(&snapshot);
        self.snapshot = Some(snapshot);
        self.load_state = LoadState::Ready;
        self.reconcile_edit();

        info!(
            "event=fetch module=session status=ok seq={} version={version}",
            ticket.seq()
        );
        Ok(FetchOutcome::Applied { version })
    }

    /// Runs one full fetch round-trip against `backend`.
    pub fn load<B: OrgBackend + ?Sized>(
        &mut self,
        backend: &B,
    ) -> Result<FetchOutcome, FetchError> {
        let ticket = self.begin_fetch();
        let result = fetch_payload(backend);
        self.finish_fetch(ticket, result)
    }

    /// Resolves a chart click; returns whether an edit dialog opened.
    pub fn click(&mut self, node_id: &str) -> Result<bool, SessionError> {
        let Some(event) = self.chart.click(node_id) else {
            return Ok(false);
        };
        self.select(event).map(|()| true)
    }

    /// Opens (or retargets) the edit dialog for the selected node.
    pub fn select(&mut self, event: NodeSelected) -> Result<(), SessionError> {
        if self.is_saving() {
            return Err(SessionError::SaveInProgress);
        }
        let snapshot = self.snapshot.as_ref().ok_or(SessionError::NotLoaded)?;
        match snapshot.get(&event.node_id) {
            Some(node) if node.is_editable() => {}
            _ => {
                return Err(ValidationError::NotEditable(event.node_id).into());
            }
        }

        debug!(
            "event=edit_select module=session status=ok node_id={}",
            event.node_id
        );
        self.edit = EditState::Editing(EditDraft {
            node_id: event.node_id,
            original_parent_id: event.current_parent_id.clone(),
            proposed_parent_id: event.current_parent_id,
        });
        self.notice = None;
        Ok(())
    }

    /// Updates the proposed parent; blank ids mean "no parent".
    pub fn choose_parent(&mut self, parent_id: Option<NodeId>) -> Result<(), SessionError> {
        match &mut self.edit {
            EditState::Idle => Err(SessionError::NotEditing),
            EditState::Saving { .. } => Err(SessionError::SaveInProgress),
            EditState::Editing(draft) => {
                draft.proposed_parent_id = parent_id
                    .map(|value| value.trim().to_string())
                    .filter(|value| !value.is_empty());
                Ok(())
            }
        }
    }

    /// Closes the edit dialog and discards the proposal.
    pub fn cancel(&mut self) -> Result<(), SessionError> {
        if self.is_saving() {
            return Err(SessionError::SaveInProgress);
        }
        self.edit = EditState::Idle;
        self.notice = None;
        Ok(())
    }

    /// Validates the open proposal and enters Saving.
    ///
    /// # Errors
    /// - `Validation` when the proposal is inadmissible; stays in Editing.
    /// - `NotEditing`/`SaveInProgress`/`NotLoaded` for wrong-state calls.
    pub fn begin_save(&mut self) -> Result<PersistTicket, SessionError> {
        let draft = match &self.edit {
            EditState::Idle => return Err(SessionError::NotEditing),
            EditState::Saving { .. } => return Err(SessionError::SaveInProgress),
            EditState::Editing(draft) => draft.clone(),
        };
        let snapshot = self.snapshot.as_ref().ok_or(SessionError::NotLoaded)?;

        if let Err(err) = check_proposal(snapshot, &draft) {
            warn!(
                "event=edit_validate module=session status=rejected node_id={} reason={err:?}",
                draft.node_id
            );
            self.notice = Some(err.to_string());
            return Err(err.into());
        }

        self.persist_seq += 1;
        let ticket = PersistTicket {
            seq: self.persist_seq,
            node_id: draft.node_id.clone(),
            parent_id: draft.proposed_parent_id.clone(),
        };
        info!(
            "event=persist module=session status=start seq={} node_id={}",
            ticket.seq, ticket.node_id
        );
        self.edit = EditState::Saving {
            draft,
            ticket: ticket.clone(),
        };
        self.notice = None;
        Ok(ticket)
    }

    /// Completes the in-flight persist.
    ///
    /// Success commits the new parent and returns to Idle. Failure keeps the
    /// snapshot untouched and returns to Editing for a manual retry.
    pub fn finish_save(
        &mut self,
        ticket: &PersistTicket,
        result: Result<UpdateOutcome, BackendError>,
    ) -> Result<(), SessionError> {
        let draft = match &self.edit {
            EditState::Saving { draft, ticket: pending } if pending == ticket => draft.clone(),
            _ => return Err(SessionError::StaleTicket),
        };

        let failure = match result {
            Ok(outcome) if outcome.success => None,
            Ok(_) => Some(PersistError::Rejected {
                node_id: ticket.node_id.clone(),
            }),
            Err(err) => Some(PersistError::Backend(err)),
        };

        if let Some(err) = failure {
            error!(
                "event=persist module=session status=error seq={} node_id={} error={}",
                ticket.seq,
                ticket.node_id,
                match &err {
                    PersistError::Rejected { .. } => "rejected".to_string(),
                    PersistError::Backend(inner) => inner.to_string(),
                }
            );
            self.edit = EditState::Editing(draft);
            self.notice = Some(err.to_string());
            return Err(err.into());
        }

        self.commit(ticket);
        self.edit = EditState::Idle;
        self.notice = None;
        Ok(())
    }

    /// Runs one validate-and-persist round-trip against `backend`.
    pub fn save<B: OrgBackend + ?Sized>(&mut self, backend: &B) -> Result<(), SessionError> {
        let ticket = self.begin_save()?;
        let result = backend.update_parent(ticket.node_id(), ticket.parent_id());
        self.finish_save(&ticket, result)
    }

    fn build_committed_nodes(&self, payload: &FetchPayload) -> Result<Vec<OrgNode>, FetchError> {
        let nodes = build_nodes(payload.root.as_ref(), &payload.members, &self.options)
            .map_err(FetchError::Transform)?;
        if nodes.is_empty() {
            return Err(FetchError::RootNotFound);
        }
        check_integrity(&nodes).map_err(FetchError::Corrupt)?;
        Ok(nodes)
    }

    fn commit(&mut self, ticket: &PersistTicket) {
        let committed = self
            .snapshot
            .as_ref()
            .and_then(|snapshot| snapshot.with_parent(&ticket.node_id, ticket.parent_id.clone()));
        let Some(committed) = committed else {
            warn!(
                "event=persist module=session status=ok seq={} node_id={} note=node_no_longer_loaded",
                ticket.seq, ticket.node_id
            );
            return;
        };

        self.next_version = self.next_version.max(committed.version() + 1);
        let committed = Arc::new(committed);
        self.chart.sync(&committed);
        info!(
            "event=persist module=session status=ok seq={} node_id={} version={}",
            ticket.seq,
            ticket.node_id,
            committed.version()
        );
        self.snapshot = Some(committed);
    }

    fn reconcile_edit(&mut self) {
        let EditState::Editing(draft) = &self.edit else {
            return;
        };
        let still_editable = self
            .snapshot
            .as_ref()
            .and_then(|snapshot| snapshot.get(&draft.node_id))
            .is_some_and(OrgNode::is_editable);
        if !still_editable {
            debug!(
                "event=edit_select module=session status=closed node_id={} reason=node_gone",
                draft.node_id
            );
            self.edit = EditState::Idle;
        }
    }
}

fn check_proposal(snapshot: &Hierarchy, draft: &EditDraft) -> Result<(), ValidationError> {
    let nodes = snapshot.nodes();
    validate_reparent(nodes, &draft.node_id, draft.proposed_parent_id.as_deref())?;

    let edit_is_root = snapshot.get(&draft.node_id).is_some_and(OrgNode::is_root);
    let projected_roots = count_roots(nodes) - usize::from(edit_is_root)
        + usize::from(draft.proposed_parent_id.is_none());
    if projected_roots != 1 {
        return Err(ValidationError::MultipleRoots {
            node_id: draft.node_id.clone(),
            existing_root: snapshot
                .root()
                .map(|root| root.id.clone())
                .unwrap_or_default(),
        });
    }
    Ok(())
}

fn fetch_payload<B: OrgBackend + ?Sized>(backend: &B) -> Result<FetchPayload, BackendError> {
    let root = backend.fetch_root()?;
    let members = backend.fetch_members()?;
    Ok(FetchPayload { root, members })
}
