pub mod account;
pub mod company;
pub mod config;
pub mod entry;
pub mod invoice;
pub mod product;
pub mod purchase;
pub mod sale;

pub use account::{AccountKind, AnalyticAccount};
pub use company::Company;
pub use config::TemplateCompany;
pub use entry::{AnalyticEntry, EntryOrigin};
pub use invoice::{Invoice, InvoiceLine};
pub use product::{Product, Template};
pub use purchase::{Purchase, PurchaseLine, PurchaseRequest, RequestState};
pub use sale::{Sale, SaleLine};
