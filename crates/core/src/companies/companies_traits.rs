use crate::companies::companies_model::{Company, CompanyListResponse, NewCompany};
use crate::errors::Result;

pub trait CompanyRepositoryTrait: Send + Sync {
    fn load_companies(&self) -> Result<Vec<Company>>;
    fn load_company_by_id(&self, company_id: &str) -> Result<Company>;
    fn insert_new_company(&self, new_company: NewCompany) -> Result<Company>;
    fn delete_company(&self, company_id: &str) -> Result<usize>;
}

pub trait CompanyServiceTrait: Send + Sync {
    fn list_companies(&self) -> Result<CompanyListResponse>;
    fn get_company(&self, company_id: &str) -> Result<Company>;
    fn create_company(&self, new_company: NewCompany) -> Result<Company>;
    fn delete_company(&self, company_id: &str) -> Result<usize>;
}
