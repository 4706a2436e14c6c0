//! Parlay task construction
//!
//! Submission names are fixed per task kind and never derived from the host
//! address; parlay tracks execution per address independently.

use plunder_api::models::{Action, ParlayDeployment, TreasureMap};

/// Name of the liveness (uptime) task
pub const LIVENESS_TASK: &str = "Uptime";

/// Name of the Kubernetes installation task
pub const KUBERNETES_TASK: &str = "Kubernetes";

/// Name of the hard reset task
pub const RESET_TASK: &str = "Reset";

const KUBERNETES_VERSION: &str = "1.14.1";
const POD_NETWORK_CIDR: &str = "10.244.0.0/16";

fn command(name: &str, command: &str) -> Action {
    Action {
        action_type: "command".to_string(),
        name: name.to_string(),
        command: Some(command.to_string()),
        command_sudo: Some("root".to_string()),
        timeout: 0,
        ignore_fail: false,
    }
}

fn single_host(name: &str, address: &str, actions: Vec<Action>) -> TreasureMap {
    TreasureMap {
        deployments: vec![ParlayDeployment {
            name: name.to_string(),
            parallel: false,
            parallel_sessions: 0,
            hosts: vec![address.to_string()],
            actions,
        }],
    }
}

/// Actions of a task, in execution order
pub fn actions(task: &TreasureMap) -> impl Iterator<Item = &Action> {
    task.deployments.iter().flat_map(|d| d.actions.iter())
}

/// Probe that succeeds once the freshly installed OS is reachable
pub fn liveness_task(address: &str) -> TreasureMap {
    let mut probe = command("Check host uptime", "uptime");
    probe.command_sudo = None;
    probe.timeout = 10;
    single_host(LIVENESS_TASK, address, vec![probe])
}

/// Kubeadm bootstrap steps. Each step relies on the side effects of the ones
/// before it.
pub fn kubeadm_actions() -> Vec<Action> {
    vec![
        command("Disable swap", "swapoff -a && sed -i '/ swap / s/^/#/' /etc/fstab"),
        command(
            "Install transport packages",
            "apt-get update && apt-get install -y apt-transport-https ca-certificates curl gnupg",
        ),
        command(
            "Add Kubernetes signing key",
            "curl -fsSL https://packages.cloud.google.com/apt/doc/apt-key.gpg | apt-key add -",
        ),
        command(
            "Add Kubernetes repository",
            "echo 'deb https://apt.kubernetes.io/ kubernetes-xenial main' > /etc/apt/sources.list.d/kubernetes.list",
        ),
        command(
            "Install container runtime and kubeadm",
            &format!(
                "apt-get update && apt-get install -y docker.io kubelet={v}-00 kubeadm={v}-00 kubectl={v}-00",
                v = KUBERNETES_VERSION
            ),
        ),
        command("Hold Kubernetes packages", "apt-mark hold kubelet kubeadm kubectl"),
        command(
            "Initialise control plane",
            &format!(
                "kubeadm init --kubernetes-version {} --pod-network-cidr {}",
                KUBERNETES_VERSION, POD_NETWORK_CIDR
            ),
        ),
        command(
            "Configure kubectl",
            "mkdir -p $HOME/.kube && cp -f /etc/kubernetes/admin.conf $HOME/.kube/config",
        ),
        command(
            "Allow workloads on control plane",
            "kubectl --kubeconfig /etc/kubernetes/admin.conf taint nodes --all node-role.kubernetes.io/master-",
        ),
        command(
            "Install pod network",
            "kubectl --kubeconfig /etc/kubernetes/admin.conf apply -f https://raw.githubusercontent.com/coreos/flannel/master/Documentation/kube-flannel.yml",
        ),
    ]
}

/// Liveness actions followed by the kubeadm bootstrap, as one submission
pub fn kubernetes_install_task(address: &str) -> TreasureMap {
    let mut actions: Vec<Action> = liveness_task(address)
        .deployments
        .into_iter()
        .flat_map(|d| d.actions)
        .collect();
    actions.extend(kubeadm_actions());
    single_host(KUBERNETES_TASK, address, actions)
}

/// Steps undoing a kubeadm bootstrap. Not used by destroy, which resets the
/// host outright.
pub fn kubernetes_teardown_actions() -> Vec<Action> {
    let mut drain = command(
        "Drain node",
        "kubectl --kubeconfig /etc/kubernetes/admin.conf drain $(hostname) --delete-local-data --force --ignore-daemonsets",
    );
    drain.ignore_fail = true;

    vec![
        drain,
        command("Reset kubeadm", "kubeadm reset -f"),
        command(
            "Flush iptables",
            "iptables -F && iptables -t nat -F && iptables -t mangle -F && iptables -X",
        ),
        command("Remove kubectl config", "rm -rf $HOME/.kube"),
    ]
}

/// Immediate reboot through sysrq. The session dies with the host, so the
/// action must not wait for a reply.
pub fn reset_task(address: &str) -> TreasureMap {
    let mut reset = command(
        "Reset host through sysrq",
        "sh -c 'echo 1 > /proc/sys/kernel/sysrq; echo b > /proc/sysrq-trigger' &",
    );
    reset.ignore_fail = true;
    reset.timeout = 5;
    single_host(RESET_TASK, address, vec![reset])
}
