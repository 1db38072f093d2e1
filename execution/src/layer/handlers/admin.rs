use super::*;
use gamehub_types::registry::MAX_ADMINS;

impl<'a, S: State, O: OwnerQuery> Layer<'a, S, O> {
    // === Admin Registry ===

    /// Replace the super admin. The new super admin is also made an admin.
    pub async fn set_super_admin(
        &mut self,
        caller: &Address,
        admin: &Address,
    ) -> Result<Vec<Event>, CallError> {
        self.require_contract_owner(caller)?;

        let mut admins = load_admins(self).await?;
        if !admins.contains(admin) && admins.admins.len() >= MAX_ADMINS {
            return Err(RegistryError::PreconditionFailed("admin list is full".to_string()).into());
        }
        admins.admins.insert(*admin);

        self.insert(Key::SuperAdmin, Value::Address(*admin));
        self.insert(Key::Admins, Value::Admins(admins));
        info!(admin = %admin, "super admin set");
        Ok(vec![])
    }

    pub async fn add_admin(
        &mut self,
        caller: &Address,
        admin: &Address,
    ) -> Result<Vec<Event>, CallError> {
        self.require_super_admin(caller).await?;

        let mut admins = load_admins(self).await?;
        if admins.contains(admin) {
            return Ok(vec![]);
        }
        if admins.admins.len() >= MAX_ADMINS {
            return Err(RegistryError::PreconditionFailed("admin list is full".to_string()).into());
        }
        admins.admins.insert(*admin);
        self.insert(Key::Admins, Value::Admins(admins));
        info!(admin = %admin, "admin added");
        Ok(vec![])
    }

    pub async fn remove_admin(
        &mut self,
        caller: &Address,
        admin: &Address,
    ) -> Result<Vec<Event>, CallError> {
        self.require_super_admin(caller).await?;

        let mut admins = load_admins(self).await?;
        if !admins.admins.remove(admin) {
            return Err(RegistryError::NotFound {
                what: "admin",
                key: admin.to_string(),
            }
            .into());
        }
        // The caller is the super admin at this point.
        if admin == caller {
            return Err(RegistryError::PreconditionFailed(
                "the super admin cannot be removed from the admin list".to_string(),
            )
            .into());
        }
        self.insert(Key::Admins, Value::Admins(admins));
        info!(admin = %admin, "admin removed");
        Ok(vec![])
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::mocks::{deployment, wallet, StaticOwners};
    use crate::query;
    use crate::state::Memory;
    use commonware_runtime::{deterministic::Runner, Runner as _};

    #[test]
    fn super_admin_is_always_an_admin() {
        let executor = Runner::default();
        executor.start(|_| async move {
            let state = Memory::default();
            let owners = StaticOwners::default();
            let deployment = deployment();
            let mut layer = Layer::new(&state, &owners, deployment, 0);

            let err = layer.set_super_admin(&wallet(1), &wallet(1)).await.unwrap_err();
            assert!(matches!(
                err.rejection(),
                Some(RegistryError::Unauthorized { required: Role::ContractOwner, .. })
            ));

            layer.set_super_admin(&deployment.owner, &wallet(1)).await.unwrap();
            layer.set_super_admin(&deployment.owner, &wallet(1)).await.unwrap();
            assert_eq!(query::super_admin(&layer).await.unwrap(), Some(wallet(1)));
            assert_eq!(query::admins(&layer).await.unwrap(), vec![wallet(1)]);

            // Handing over keeps the previous super admin as a plain admin.
            layer.set_super_admin(&deployment.owner, &wallet(2)).await.unwrap();
            assert_eq!(query::super_admin(&layer).await.unwrap(), Some(wallet(2)));
            assert_eq!(query::admins(&layer).await.unwrap(), vec![wallet(1), wallet(2)]);
        });
    }

    #[test]
    fn only_super_admin_manages_admins() {
        let executor = Runner::default();
        executor.start(|_| async move {
            let state = Memory::default();
            let owners = StaticOwners::default();
            let deployment = deployment();
            let mut layer = Layer::new(&state, &owners, deployment, 0);

            // No super admin configured yet.
            assert!(layer.add_admin(&wallet(1), &wallet(2)).await.is_err());

            layer.set_super_admin(&deployment.owner, &wallet(1)).await.unwrap();
            layer.add_admin(&wallet(1), &wallet(2)).await.unwrap();
            layer.add_admin(&wallet(1), &wallet(2)).await.unwrap();
            assert_eq!(query::admins(&layer).await.unwrap(), vec![wallet(1), wallet(2)]);

            let err = layer.add_admin(&wallet(2), &wallet(3)).await.unwrap_err();
            assert!(matches!(
                err.rejection(),
                Some(RegistryError::Unauthorized { required: Role::SuperAdmin, .. })
            ));
            // The contract owner is not implicitly the super admin.
            assert!(layer.add_admin(&deployment.owner, &wallet(3)).await.is_err());
        });
    }

    #[test]
    fn removing_admins() {
        let executor = Runner::default();
        executor.start(|_| async move {
            let state = Memory::default();
            let owners = StaticOwners::default();
            let deployment = deployment();
            let mut layer = Layer::new(&state, &owners, deployment, 0);
            layer.set_super_admin(&deployment.owner, &wallet(1)).await.unwrap();
            layer.add_admin(&wallet(1), &wallet(2)).await.unwrap();

            let err = layer.remove_admin(&wallet(1), &wallet(5)).await.unwrap_err();
            assert!(matches!(
                err.rejection(),
                Some(RegistryError::NotFound { what: "admin", .. })
            ));

            let err = layer.remove_admin(&wallet(1), &wallet(1)).await.unwrap_err();
            assert!(matches!(
                err.rejection(),
                Some(RegistryError::PreconditionFailed(_))
            ));

            layer.remove_admin(&wallet(1), &wallet(2)).await.unwrap();
            assert_eq!(query::admins(&layer).await.unwrap(), vec![wallet(1)]);
        });
    }
}
