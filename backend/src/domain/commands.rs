//! Domain-level command types
//! These structs are the inputs accepted by the services in this layer. A UI
//! or transport layer maps whatever it receives onto them.

pub mod doctor {
    use shared::PercentageMap;

    /// Input for registering a new doctor.
    #[derive(Debug, Clone)]
    pub struct CreateDoctorCommand {
        pub name: String,
        pub percentages: PercentageMap,
    }

    /// Input for replacing a doctor's category percentages.
    #[derive(Debug, Clone)]
    pub struct UpdateDoctorPercentagesCommand {
        pub doctor_id: String,
        pub percentages: PercentageMap,
    }
}

pub mod visit {
    use chrono::NaiveDate;
    use shared::FeeMap;

    /// Input for recording a patient visit.
    #[derive(Debug, Clone)]
    pub struct RecordVisitCommand {
        pub patient_name: String,
        pub contact: String,
        pub doctor_id: String,
        /// Uses today's local date if not provided
        pub date: Option<NaiveDate>,
        pub fees: FeeMap,
    }
}

pub mod expense {
    use chrono::NaiveDate;

    #[derive(Debug, Clone)]
    pub struct RecordExpenseCommand {
        /// Uses today's local date if not provided
        pub date: Option<NaiveDate>,
        pub category: String,
        pub description: String,
        pub amount: f64,
    }
}

pub mod salary {
    use chrono::NaiveDate;

    #[derive(Debug, Clone)]
    pub struct RecordSalaryCommand {
        pub staff_name: String,
        pub role: String,
        /// "YYYY-MM"
        pub month: String,
        pub amount: f64,
        /// Uses today's local date if not provided
        pub paid_on: Option<NaiveDate>,
    }
}
