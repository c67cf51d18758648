use std::sync::atomic::{AtomicU64, Ordering};

#[derive(Debug, Default)]
pub struct Metrics {
    card_mutations: AtomicU64,
    mutation_errors: AtomicU64,
    backups_created: AtomicU64,
    sensor_polls: AtomicU64,
    sensor_poll_errors: AtomicU64,
}

impl Metrics {
    pub fn record_card_mutation(&self) {
        self.card_mutations.fetch_add(1, Ordering::Relaxed);
    }

    pub fn record_mutation_error(&self) {
        self.mutation_errors.fetch_add(1, Ordering::Relaxed);
    }

    pub fn record_backup(&self) {
        self.backups_created.fetch_add(1, Ordering::Relaxed);
    }

    pub fn record_sensor_poll(&self, success: bool) {
        self.sensor_polls.fetch_add(1, Ordering::Relaxed);
        if !success {
            self.sensor_poll_errors.fetch_add(1, Ordering::Relaxed);
        }
    }

    pub fn render_prometheus(&self) -> String {
        let mutations = self.card_mutations.load(Ordering::Relaxed);
        let mutation_errors = self.mutation_errors.load(Ordering::Relaxed);
        let backups = self.backups_created.load(Ordering::Relaxed);
        let polls = self.sensor_polls.load(Ordering::Relaxed);
        let poll_errors = self.sensor_poll_errors.load(Ordering::Relaxed);

        format!(
            "# TYPE parkgate_card_mutations_total counter\n\
parkgate_card_mutations_total {}\n\
# TYPE parkgate_mutation_errors_total counter\n\
parkgate_mutation_errors_total {}\n\
# TYPE parkgate_backups_created_total counter\n\
parkgate_backups_created_total {}\n\
# TYPE parkgate_sensor_polls_total counter\n\
parkgate_sensor_polls_total {}\n\
# TYPE parkgate_sensor_poll_errors_total counter\n\
parkgate_sensor_poll_errors_total {}\n",
            mutations, mutation_errors, backups, polls, poll_errors
        )
    }
}
