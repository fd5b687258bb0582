use std::sync::Arc;

use diesel::prelude::*;
use uuid::Uuid;

use crate::companies::companies_errors::CompanyError;
use crate::companies::companies_model::{Company, NewCompany};
use crate::companies::companies_traits::CompanyRepositoryTrait;
use crate::db::{get_connection, DbPool};
use crate::errors::Result;
use crate::schema::companies;

pub struct CompanyRepository {
    pool: Arc<DbPool>,
}

impl CompanyRepository {
    pub fn new(pool: Arc<DbPool>) -> Self {
        CompanyRepository { pool }
    }
}

impl CompanyRepositoryTrait for CompanyRepository {
    fn load_companies(&self) -> Result<Vec<Company>> {
        let mut conn = get_connection(&self.pool)?;
        Ok(companies::table
            .select(Company::as_select())
            .order(companies::name.asc())
            .load::<Company>(&mut conn)
            .map_err(CompanyError::from)?)
    }

    fn load_company_by_id(&self, company_id: &str) -> Result<Company> {
        let mut conn = get_connection(&self.pool)?;
        Ok(companies::table
            .find(company_id)
            .select(Company::as_select())
            .first::<Company>(&mut conn)
            .map_err(CompanyError::from)?)
    }

    fn insert_new_company(&self, mut new_company: NewCompany) -> Result<Company> {
        let mut conn = get_connection(&self.pool)?;
        new_company.id = Some(Uuid::new_v4().to_string());
        Ok(diesel::insert_into(companies::table)
            .values(&new_company)
            .returning(Company::as_returning())
            .get_result(&mut conn)
            .map_err(CompanyError::from)?)
    }

    fn delete_company(&self, company_id: &str) -> Result<usize> {
        let mut conn = get_connection(&self.pool)?;
        Ok(diesel::delete(companies::table.find(company_id))
            .execute(&mut conn)
            .map_err(CompanyError::from)?)
    }
}
