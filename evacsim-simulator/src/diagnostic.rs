use serde::Serialize;

/// Body an agent came into contact with.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(tag = "kind", content = "index", rename_all = "snake_case")]
pub enum ContactTarget {
    Agent(usize),
    Wall(usize),
}

/// Record of a contact detected while evaluating forces.
#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct ContactEvent {
    /// Step whose state the contact was detected in.
    pub step: usize,
    pub agent: usize,
    pub target: ContactTarget,
    /// Clearance left after the contact margin. Never positive.
    pub gap: f64,
}

#[derive(Debug, Default, Clone, Serialize)]
pub struct DiagnosticLog {
    pub scenario: String,
    pub total_steps: usize,
    pub contact_count: usize,
    pub step_metrics: StepMetricsCollection,
    #[serde(skip_serializing_if = "Vec::is_empty")]
    pub contacts: Vec<ContactEvent>,
}

impl DiagnosticLog {
    pub fn push(&mut self, step_metrics: StepMetrics) {
        self.contact_count += step_metrics.contact_count;
        self.step_metrics.push(step_metrics);
        self.total_steps += 1;
    }

    pub fn extend_contacts(&mut self, contacts: impl IntoIterator<Item = ContactEvent>) {
        self.contacts.extend(contacts);
    }
}

#[derive(Debug, Default, Clone, Serialize)]
pub struct StepMetricsCollection {
    pub active_agent_count: Vec<usize>,
    pub exited_count: Vec<usize>,
    pub contact_count: Vec<usize>,
    pub time_calc_forces: Vec<f64>,
    pub time_integrate: Vec<f64>,
}

impl StepMetricsCollection {
    pub fn push(&mut self, metrics: StepMetrics) {
        self.active_agent_count.push(metrics.active_agent_count);
        self.exited_count.push(metrics.exited_count);
        self.contact_count.push(metrics.contact_count);
        self.time_calc_forces.push(metrics.time_calc_forces);
        self.time_integrate.push(metrics.time_integrate);
    }
}

#[derive(Debug, Default, Clone, Serialize)]
pub struct StepMetrics {
    pub step: usize,
    /// Agents still in the room after the step.
    pub active_agent_count: usize,
    /// Agents that reached the exit during the step.
    pub exited_count: usize,
    pub contact_count: usize,
    pub time_calc_forces: f64,
    pub time_integrate: f64,
}
