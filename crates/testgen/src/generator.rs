use std::collections::HashSet;
use std::fmt::Write;

use chrono::{DateTime, Duration, Local};
use rand::distr::{Distribution, Uniform};
use rayon::iter::{IntoParallelIterator, ParallelIterator};
use serde::{Deserialize, Serialize};
use tscop_core::schedule::{Action, Schedule};
use tscop_core::timestamp::{TableError, Timestamp, TimestampTable, Transaction};
use typed_builder::TypedBuilder;

#[derive(Clone, Debug, Default, Deserialize, Serialize, TypedBuilder)]
pub struct WorkloadParams {
    #[builder(default)]
    pub id: u64,
    pub n_object: u64,
    pub n_transaction: u64,
    pub n_schedule: u64,
    pub n_operation: u64,
    #[builder(default = 100)]
    pub max_timestamp: Timestamp,
}

#[derive(Deserialize, Serialize, Debug)]
pub struct GeneratedWorkload {
    params: WorkloadParams,
    info: String,
    start: DateTime<Local>,
    end: DateTime<Local>,
    objects: Vec<String>,
    transactions: Vec<Transaction>,
    schedules: Vec<Schedule>,
}

impl GeneratedWorkload {
    #[must_use]
    pub const fn get_id(&self) -> u64 {
        self.params.id
    }

    #[must_use]
    pub const fn get_params(&self) -> &WorkloadParams {
        &self.params
    }

    #[must_use]
    pub fn get_duration(&self) -> Duration {
        self.end - self.start
    }

    #[must_use]
    pub fn objects(&self) -> &[String] {
        &self.objects
    }

    #[must_use]
    pub fn transactions(&self) -> &[Transaction] {
        &self.transactions
    }

    #[must_use]
    pub fn schedules(&self) -> &[Schedule] {
        &self.schedules
    }

    /// # Errors
    ///
    /// Never fails for generated workloads, whose transaction ids are unique.
    pub fn timestamp_table(&self) -> Result<TimestampTable, TableError> {
        let mut table = TimestampTable::new();
        for transaction in &self.transactions {
            table.insert(transaction.id.clone(), transaction.timestamp)?;
        }
        Ok(table)
    }

    /// Render the workload as an input file.
    #[must_use]
    pub fn to_input(&self) -> String {
        let mut output = String::new();
        let _ = writeln!(
            output,
            "# workload {} ({}), generated {}",
            self.params.id,
            self.info,
            self.start.to_rfc3339()
        );
        let _ = writeln!(output, "{};", self.objects.join(", "));
        let ids: Vec<&str> = self.transactions.iter().map(|t| t.id.as_str()).collect();
        let _ = writeln!(output, "{};", ids.join(", "));
        let timestamps: Vec<String> = self
            .transactions
            .iter()
            .map(|t| t.timestamp.to_string())
            .collect();
        let _ = writeln!(output, "{};", timestamps.join(", "));
        for schedule in &self.schedules {
            let _ = writeln!(output, "{schedule}");
        }
        output
    }
}

/// Object name for `index`: `A`..`Z`, then `AA`, `AB`, ...
#[must_use]
pub fn object_name(mut index: u64) -> String {
    let mut name = Vec::new();
    loop {
        #[allow(clippy::cast_possible_truncation)]
        name.push(char::from(b'A' + (index % 26) as u8));
        if index < 26 {
            break;
        }
        index = index / 26 - 1;
    }
    name.iter().rev().collect()
}

/// Generate objects, transactions and `n_schedule` schedules of up to
/// `n_operation` operations each.
///
/// Timestamps are drawn uniformly from `0..=max_timestamp` and may repeat.
/// Each operation picks a random transaction; a read (50%), write (40%) or
/// commit (10%) follows. A transaction issues nothing after its commit, so
/// schedules can be shorter than `n_operation`.
///
/// # Panics
///
/// Panics if `n_object` or `n_transaction` is zero, or `max_timestamp` is
/// negative (cannot create a uniform distribution over an empty range).
#[must_use]
pub fn generate_single_workload(
    n_object: u64,
    n_transaction: u64,
    n_schedule: u64,
    n_operation: u64,
    max_timestamp: Timestamp,
) -> (Vec<String>, Vec<Transaction>, Vec<Schedule>) {
    let mut random_generator = rand::rng();
    let object_range = Uniform::new(0, n_object).unwrap();
    let transaction_range = Uniform::new(0, n_transaction).unwrap();
    let timestamp_range = Uniform::new_inclusive(0, max_timestamp).unwrap();
    let kind_range = Uniform::new(0u8, 10).unwrap();

    let objects: Vec<String> = (0..n_object).map(object_name).collect();
    let transactions: Vec<Transaction> = (0..n_transaction)
        .map(|t| Transaction {
            id: format!("t{t}"),
            timestamp: timestamp_range.sample(&mut random_generator),
        })
        .collect();

    let schedules = (1..=n_schedule)
        .map(|i_schedule| {
            let mut schedule = Schedule::new(format!("E_{i_schedule}"));
            let mut committed: HashSet<u64> = HashSet::new();
            for _ in 0..n_operation {
                let transaction = transaction_range.sample(&mut random_generator);
                if committed.contains(&transaction) {
                    continue;
                }
                let id = format!("t{transaction}");
                let kind = kind_range.sample(&mut random_generator);
                if kind == 0 {
                    committed.insert(transaction);
                    schedule.push(Action::commit(id));
                    continue;
                }
                #[allow(clippy::cast_possible_truncation)]
                let object = objects[object_range.sample(&mut random_generator) as usize].clone();
                let action = if kind <= 5 {
                    Action::read(id, object)
                } else {
                    Action::write(id, object)
                };
                schedule.push(action);
            }
            schedule
        })
        .collect();

    (objects, transactions, schedules)
}

/// Generate `n_workload` workloads in parallel, with ids `0..n_workload`.
///
/// # Panics
///
/// See [`generate_single_workload`].
#[must_use]
pub fn generate_mult_workloads(n_workload: u64, params: &WorkloadParams) -> Vec<GeneratedWorkload> {
    (0..n_workload)
        .into_par_iter()
        .map(|i_workload| {
            let start_time = Local::now();
            let (objects, transactions, schedules) = generate_single_workload(
                params.n_object,
                params.n_transaction,
                params.n_schedule,
                params.n_operation,
                params.max_timestamp,
            );
            let end_time = Local::now();
            GeneratedWorkload {
                params: WorkloadParams {
                    id: i_workload,
                    ..params.clone()
                },
                info: "generated".to_string(),
                start: start_time,
                end: end_time,
                objects,
                transactions,
                schedules,
            }
        })
        .collect()
}
