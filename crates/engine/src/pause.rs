// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

use std::time::Duration;

/// Sleep between attempts of a retry loop.
///
/// A zero delay still yields so a tight loop cannot starve the task that
/// would release what it is waiting on.
pub(crate) async fn pause(delay: Duration) {
    if delay.is_zero() {
        tokio::task::yield_now().await;
    } else {
        tokio::time::sleep(delay).await;
    }
}
