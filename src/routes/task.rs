/*
 *     Copyright (C) 2023  Fritz Ochsmann
 *
 *     This program is free software: you can redistribute it and/or modify
 *     it under the terms of the GNU Affero General Public License as published
 *     by the Free Software Foundation, either version 3 of the License, or
 *     (at your option) any later version.
 *
 *     This program is distributed in the hope that it will be useful,
 *     but WITHOUT ANY WARRANTY; without even the implied warranty of
 *     MERCHANTABILITY or FITNESS FOR A PARTICULAR PURPOSE.  See the
 *     GNU Affero General Public License for more details.
 *
 *     You should have received a copy of the GNU Affero General Public License
 *     along with this program.  If not, see <http://www.gnu.org/licenses/>.
 */

use crate::auth::authz::owned_task;
use crate::database::definitions::account::Account;
use crate::database::definitions::task::{Task, WriteTask};
use crate::error::ValidationErrorResponse;
use crate::forms::task::TaskForm;
use crate::forms::Validate;
use crate::prelude::*;
use crate::routes::extractor::Query;
use crate::routes::response::{FormPage, SeeOther};
use aide::axum::routing::get_with;
use aide::axum::ApiRouter;
use aide::transform::TransformOperation;
use axum::extract::{Path, State};
use axum::Extension;

pub fn router(state: ApplicationState) -> ApiRouter {
    ApiRouter::new()
        .api_route("/", get_with(list_tasks, list_tasks_docs))
        .api_route("/task/:id", get_with(get_task, get_task_docs))
        .api_route(
            "/create-task",
            get_with(create_task_page, create_task_page_docs)
                .post_with(create_task, create_task_docs),
        )
        .api_route(
            "/task-edit/:id",
            get_with(edit_task_page, edit_task_page_docs).post_with(edit_task, edit_task_docs),
        )
        .api_route(
            "/deletetask/:id",
            get_with(delete_task_page, delete_task_page_docs)
                .post_with(delete_task, delete_task_docs),
        )
        .with_state(state)
}

#[derive(Deserialize, JsonSchema, Debug, Clone, Default)]
pub struct TaskListQuery {
    /// case-insensitive part of the title
    #[serde(rename = "search-area")]
    search: Option<String>,
}

#[derive(Serialize, JsonSchema, Debug, Clone)]
pub struct TaskListPage {
    /// the tasks of the account
    alltasks: Vec<Task>,
    /// number of incomplete tasks, regardless of the search
    count: u64,
    search_input: String,
}

async fn list_tasks(
    State(state): State<ApplicationState>,
    Extension(account): Extension<Account>,
    Query(query): Query<TaskListQuery>,
) -> Result<Json<TaskListPage>> {
    let connection = state.connection();
    let search_input = query.search.unwrap_or_default();

    let count = Task::count_incomplete(account.key(), connection).await?;
    let alltasks = Task::list(account.key(), Some(search_input.as_str()), connection).await?;

    Ok(Json(TaskListPage {
        alltasks,
        count,
        search_input,
    }))
}

fn list_tasks_docs(transform: TransformOperation) -> TransformOperation {
    transform
        .description("List the tasks of the account, incomplete ones first")
        .summary("List tasks")
        .response::<200, Json<TaskListPage>>()
}

async fn get_task(
    State(state): State<ApplicationState>,
    Extension(account): Extension<Account>,
    Path(id): Path<String>,
) -> Result<Json<Task>> {
    Ok(Json(owned_task(id.as_str(), &account, state.connection()).await?))
}

fn get_task_docs(transform: TransformOperation) -> TransformOperation {
    transform
        .description("Show a single task of the account")
        .summary("Show a task")
        .response::<200, Json<Task>>()
        .response_with::<404, Json<ApplicationErrorResponse>, _>(|transform| {
            transform.description("Unknown task or a task of another account")
        })
}

async fn create_task_page() -> Json<FormPage<TaskForm>> {
    Json(FormPage {
        initial: TaskForm::default(),
    })
}

fn create_task_page_docs(transform: TransformOperation) -> TransformOperation {
    transform
        .description("The empty task form")
        .summary("Task creation form")
        .response::<200, Json<FormPage<TaskForm>>>()
}

async fn create_task(
    State(state): State<ApplicationState>,
    Extension(account): Extension<Account>,
    Json(form): Json<TaskForm>,
) -> Result<SeeOther> {
    let form = form.validated()?;

    let mut writer = WriteTask::from(state.connection());
    writer.set_owner(Some(account.key().to_owned()));
    form.apply(&mut writer);
    writer.await?;

    Ok(SeeOther::to("/"))
}

fn create_task_docs(transform: TransformOperation) -> TransformOperation {
    transform
        .description("Create a task owned by the account")
        .summary("Create a task")
        .response::<303, SeeOther>()
        .response_with::<400, Json<ValidationErrorResponse>, _>(|transform| {
            transform.description("The form is invalid")
        })
}

#[derive(Serialize, JsonSchema, Debug, Clone)]
pub struct TaskEditPage {
    task: Task,
    initial: TaskForm,
}

async fn edit_task_page(
    State(state): State<ApplicationState>,
    Extension(account): Extension<Account>,
    Path(id): Path<String>,
) -> Result<Json<TaskEditPage>> {
    let task = owned_task(id.as_str(), &account, state.connection()).await?;

    Ok(Json(TaskEditPage {
        initial: TaskForm::from(&task),
        task,
    }))
}

fn edit_task_page_docs(transform: TransformOperation) -> TransformOperation {
    transform
        .description("The task form filled with the current values")
        .summary("Task edit form")
        .response::<200, Json<TaskEditPage>>()
}

async fn edit_task(
    State(state): State<ApplicationState>,
    Extension(account): Extension<Account>,
    Path(id): Path<String>,
    Json(form): Json<TaskForm>,
) -> Result<SeeOther> {
    let connection = state.connection();
    let task = owned_task(id.as_str(), &account, connection).await?;
    let form = form.validated()?;

    let mut writer = WriteTask::from(connection);
    writer.set_target(Some(task.id()));
    form.apply(&mut writer);
    writer.await?;

    Ok(SeeOther::to("/"))
}

fn edit_task_docs(transform: TransformOperation) -> TransformOperation {
    transform
        .description("Save the task form")
        .summary("Edit a task")
        .response::<303, SeeOther>()
        .response_with::<400, Json<ValidationErrorResponse>, _>(|transform| {
            transform.description("The form is invalid")
        })
}

async fn delete_task_page(
    State(state): State<ApplicationState>,
    Extension(account): Extension<Account>,
    Path(id): Path<String>,
) -> Result<Json<Task>> {
    Ok(Json(owned_task(id.as_str(), &account, state.connection()).await?))
}

fn delete_task_page_docs(transform: TransformOperation) -> TransformOperation {
    transform
        .description("The task to confirm the deletion for")
        .summary("Confirm deletion")
        .response::<200, Json<Task>>()
}

async fn delete_task(
    State(state): State<ApplicationState>,
    Extension(account): Extension<Account>,
    Path(id): Path<String>,
) -> Result<SeeOther> {
    let connection = state.connection();
    owned_task(id.as_str(), &account, connection)
        .await?
        .delete(connection)
        .await?;

    Ok(SeeOther::to("/"))
}

fn delete_task_docs(transform: TransformOperation) -> TransformOperation {
    transform
        .description("Delete the task")
        .summary("Delete a task")
        .response::<303, SeeOther>()
}
