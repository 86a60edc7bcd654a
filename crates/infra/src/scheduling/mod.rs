//! Background job scheduling

mod reminder_scheduler;

pub use reminder_scheduler::ReminderScheduler;
