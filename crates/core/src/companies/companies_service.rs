use std::sync::Arc;

use crate::companies::companies_model::{Company, CompanyListResponse, NewCompany};
use crate::companies::companies_traits::{CompanyRepositoryTrait, CompanyServiceTrait};
use crate::errors::Result;

pub struct CompanyService<T: CompanyRepositoryTrait> {
    company_repo: Arc<T>,
}

impl<T: CompanyRepositoryTrait> CompanyService<T> {
    pub fn new(company_repo: Arc<T>) -> Self {
        CompanyService { company_repo }
    }
}

impl<T: CompanyRepositoryTrait> CompanyServiceTrait for CompanyService<T> {
    fn list_companies(&self) -> Result<CompanyListResponse> {
        let collection = self.company_repo.load_companies()?;
        Ok(CompanyListResponse {
            count: collection.len() as i64,
            collection,
        })
    }

    fn get_company(&self, company_id: &str) -> Result<Company> {
        self.company_repo.load_company_by_id(company_id)
    }

    fn create_company(&self, new_company: NewCompany) -> Result<Company> {
        self.company_repo.insert_new_company(new_company)
    }

    fn delete_company(&self, company_id: &str) -> Result<usize> {
        self.company_repo.delete_company(company_id)
    }
}
