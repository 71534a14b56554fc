//! Account balances port.

use crate::domain::account::AccountSnapshot;

pub trait AccountPort {
    fn snapshot(&self) -> AccountSnapshot;
}
