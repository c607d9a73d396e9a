//! Onboarding task generation.
//!
//! The base set plus profile-conditional extras are declared as data: a
//! fixed template list and a `(predicate, template)` rule table evaluated
//! in declaration order. Batch task ids are v5 UUIDs derived from
//! `(owner_id, template slot)`, so regenerating for the same owner yields
//! the same ids and a retried batch insert cannot duplicate tasks.

use serde::Deserialize;
use tracing::info;
use uuid::Uuid;

use crate::error::TaskError;
use crate::store::TaskStore;
use crate::tasks::model::{Category, Frequency, Task};

/// The profile attributes the generator looks at. Other onboarding fields
/// are accepted and ignored.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct ProfileSnapshot {
    #[serde(default)]
    pub occupation: String,
    #[serde(default)]
    pub mental_wellness: String,
}

/// A task blueprint. `slot` names the template within an owner's batch
/// and seeds the deterministic task id.
#[derive(Debug, Clone, Copy)]
pub struct TaskTemplate {
    pub slot: &'static str,
    pub title: &'static str,
    pub description: &'static str,
    pub category: Category,
    pub frequency: Frequency,
}

impl TaskTemplate {
    /// Instantiate this template for an owner.
    fn instantiate(&self, owner_id: &str) -> Task {
        let id = Uuid::new_v5(
            &Uuid::NAMESPACE_OID,
            format!("tanbih/{owner_id}/{}", self.slot).as_bytes(),
        );
        Task::new(owner_id, self.title, self.description, self.category, self.frequency)
            .with_id(id)
    }
}

/// A conditional template: emitted only when the predicate holds for the
/// owner's profile.
pub struct TemplateRule {
    pub applies: fn(&ProfileSnapshot) -> bool,
    pub template: TaskTemplate,
}

/// Templates every new user receives, in order.
static BASE_TEMPLATES: &[TaskTemplate] = &[
    TaskTemplate {
        slot: "fajr-prayer",
        title: "Perform Fajr Prayer",
        description: "Wake up early and perform the Fajr prayer",
        category: Category::Prayer,
        frequency: Frequency::Daily,
    },
    TaskTemplate {
        slot: "quran-reading",
        title: "Read Quran (10 minutes)",
        description: "Spend 10 minutes reading and reflecting on the Quran",
        category: Category::Quran,
        frequency: Frequency::Daily,
    },
    TaskTemplate {
        slot: "morning-dhikr",
        title: "Morning Dhikr",
        description: "Recite morning supplications and remembrance of Allah",
        category: Category::Dhikr,
        frequency: Frequency::Daily,
    },
    TaskTemplate {
        slot: "weekly-charity",
        title: "Give Charity",
        description: "Give charity or help someone in need",
        category: Category::Charity,
        frequency: Frequency::Weekly,
    },
];

fn is_student(profile: &ProfileSnapshot) -> bool {
    profile.occupation.to_lowercase().contains("student")
}

fn needs_stress_relief(profile: &ProfileSnapshot) -> bool {
    let wellness = profile.mental_wellness.to_lowercase();
    wellness.contains("stressed") || wellness.contains("anxious")
}

/// Conditional templates, evaluated independently in this order.
static RULES: &[TemplateRule] = &[
    TemplateRule {
        applies: is_student,
        template: TaskTemplate {
            slot: "study-dua",
            title: "Study Dua",
            description: "Learn a new dua for seeking knowledge and success in studies",
            category: Category::Dua,
            frequency: Frequency::Weekly,
        },
    },
    TemplateRule {
        applies: needs_stress_relief,
        template: TaskTemplate {
            slot: "stress-relief-dua",
            title: "Stress Relief Dua",
            description: "Recite duas for peace and stress relief",
            category: Category::Dua,
            frequency: Frequency::Daily,
        },
    },
];

/// Derives an owner's initial task set from their profile.
///
/// Intended to run once per owner, at onboarding. The caller guarantees
/// that; the generator only guarantees that a re-run produces identical
/// ids, so an accidental repeat cannot duplicate the batch.
pub struct TaskTemplateGenerator {
    base: &'static [TaskTemplate],
    rules: &'static [TemplateRule],
}

impl Default for TaskTemplateGenerator {
    fn default() -> Self {
        Self {
            base: BASE_TEMPLATES,
            rules: RULES,
        }
    }
}

impl TaskTemplateGenerator {
    pub fn new() -> Self {
        Self::default()
    }

    /// Produce the ordered task set for an owner. Pure: nothing is persisted.
    pub fn generate(&self, owner_id: &str, profile: &ProfileSnapshot) -> Vec<Task> {
        let mut tasks: Vec<Task> = self
            .base
            .iter()
            .map(|template| template.instantiate(owner_id))
            .collect();

        for rule in self.rules {
            if (rule.applies)(profile) {
                tasks.push(rule.template.instantiate(owner_id));
            }
        }

        tasks
    }

    /// Generate the task set and persist it as one batch.
    ///
    /// Partial failure surfaces as `TaskError::Batch`; retrying the whole
    /// call is safe because the ids are deterministic.
    pub async fn generate_and_insert(
        &self,
        store: &dyn TaskStore,
        owner_id: &str,
        profile: &ProfileSnapshot,
    ) -> Result<Vec<Task>, TaskError> {
        let tasks = self.generate(owner_id, profile);
        store
            .insert_batch(&tasks)
            .await
            .map_err(|source| TaskError::Batch {
                expected: tasks.len(),
                source,
            })?;

        info!(owner_id, count = tasks.len(), "Onboarding tasks generated");
        Ok(tasks)
    }
}
